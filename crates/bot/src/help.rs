//! Canned help replies, rendered as fenced monospace blocks.

/// Top-level command summary.
pub const GENERAL: &str = concat!(
    "```\n",
    "+ get gitlab hook # return the webhook URL, unique per chat\n",
    "+ get gitlab token # return the webhook's secret token, unique per chat\n",
    "+ reset gitlab token # reset the webhook's secret token. Old hooks will break!\n",
    "+ jira help # get JIRA integration related help\n",
    "```",
);

/// Ticketing sub-grammar reference.
pub const JIRA: &str = concat!(
    "```\n",
    "+ set jira <api URL> # e.g. jira.example.com, jira.example.com:8443/rest/api/latest\n",
    "\t1. only https is supported; port defaults to 443, api path to /rest/api/latest\n",
    "+ set jira auth <basic_auth_token> # e.g. dXNlcm5hbWU6cGFzc3dvcmQ=\n",
    "+ set jira alias <alias>=<key> # set up to 10 command aliases\n",
    "\t1. set jira alias note=PROJ lets \"note: <text>\" create an issue under PROJ\n",
    "\t2. set jira alias note=PROJ-10 lets \"note: <text>\" append to issue PROJ-10\n",
    "+ remove jira alias <alias> # remove that alias\n",
    "+ jira config # show current config and aliases. SHA256 of the auth token is shown\n",
    "+ jira alias # show current aliases\n",
    "```",
);

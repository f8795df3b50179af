//! AES-256-CBC envelope for end-to-end encrypted assets.

use {
    aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7},
    rand::RngCore,
    sha2::{Digest, Sha256},
};

use crate::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Key size for AES-256 (32 bytes).
pub const KEY_LEN: usize = 32;

/// CBC initialization vector size, one cipher block (16 bytes).
pub const IV_LEN: usize = 16;

/// An asset sealed for upload.
///
/// Blob layout: `[iv: 16 bytes][ciphertext: plaintext padded to the block]`.
/// The digest covers the whole blob, IV included, since that is exactly
/// what the recipient downloads and must verify before decrypting.
pub struct EncryptedAsset {
    pub key: [u8; KEY_LEN],
    pub blob: Vec<u8>,
    pub sha256: [u8; 32],
}

/// Seal a plaintext under a key and IV drawn freshly for this one asset.
/// Neither is ever reused; the key travels to recipients inside the
/// end-to-end encrypted message instead of next to the blob.
#[must_use]
pub fn encrypt(plaintext: &[u8]) -> EncryptedAsset {
    let mut key = [0u8; KEY_LEN];
    rand::rng().fill_bytes(&mut key);
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let ciphertext =
        Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(IV_LEN + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);

    let sha256 = Sha256::digest(&blob).into();
    EncryptedAsset { key, blob, sha256 }
}

/// Recover the plaintext from an `[iv][ciphertext]` blob.
pub fn decrypt(key: &[u8; KEY_LEN], blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < IV_LEN * 2 || (blob.len() - IV_LEN) % 16 != 0 {
        return Err(Error::Layout);
    }
    let (iv, ciphertext) = blob.split_at(IV_LEN);
    let iv: &[u8; IV_LEN] = iv.try_into().map_err(|_| Error::Layout)?;
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::Decrypt)
}

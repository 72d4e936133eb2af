use std::collections::HashMap;

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::Rng;

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// Decode the base64 key from configuration. Must be exactly 32 bytes.
pub fn decode_key(encoded: &str) -> Result<Vec<u8>> {
    let key = BASE64
        .decode(encoded)
        .map_err(|e| anyhow!("Invalid secrets key encoding: {e}"))?;
    if key.len() != KEY_SIZE {
        return Err(anyhow!(
            "Invalid secrets key size: expected {KEY_SIZE} bytes, got {}",
            key.len()
        ));
    }
    Ok(key)
}

/// Encrypt a credential's secret field map into the compact stored form
/// `1:<nonce>:<ciphertext>`.
pub fn encrypt_secrets(fields: &HashMap<String, String>, key: &[u8]) -> Result<String> {
    let plaintext = serde_json::to_string(fields)?;
    encrypt_field(&plaintext, key)
}

/// Decrypt a stored secret map.
pub fn decrypt_secrets(encrypted: &str, key: &[u8]) -> Result<HashMap<String, String>> {
    let plaintext = decrypt_field(encrypted, key)?;
    Ok(serde_json::from_str(&plaintext)?)
}

pub fn encrypt_field(plaintext: &str, key: &[u8]) -> Result<String> {
    let (nonce, ciphertext) = encrypt_aes_gcm(plaintext.as_bytes(), key)?;
    Ok(format!("1:{}:{}", nonce, ciphertext))
}

pub fn decrypt_field(encrypted: &str, key: &[u8]) -> Result<String> {
    let parts: Vec<&str> = encrypted.split(':').collect();
    if parts.len() != 3 {
        return Err(anyhow!("Invalid encrypted field format"));
    }

    let version: u32 = parts[0].parse().map_err(|_| anyhow!("Invalid version"))?;
    if version != 1 {
        return Err(anyhow!("Unsupported encryption version: {version}"));
    }

    let decrypted = decrypt_aes_gcm(parts[1], parts[2], key)?;
    String::from_utf8(decrypted).map_err(|e| anyhow!("Invalid UTF-8: {e}"))
}

fn encrypt_aes_gcm(plaintext: &[u8], key: &[u8]) -> Result<(String, String)> {
    if key.len() != KEY_SIZE {
        return Err(anyhow!(
            "Invalid key size: expected {KEY_SIZE}, got {}",
            key.len()
        ));
    }

    let key = Key::<Aes256Gcm>::from_slice(key);
    let cipher = Aes256Gcm::new(key);

    let mut rng = rand::rng();
    let nonce_bytes: [u8; NONCE_SIZE] = std::array::from_fn(|_| rng.random());
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow!("Encryption failed: {e}"))?;

    Ok((BASE64.encode(nonce_bytes), BASE64.encode(ciphertext)))
}

fn decrypt_aes_gcm(nonce_b64: &str, ciphertext_b64: &str, key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != KEY_SIZE {
        return Err(anyhow!(
            "Invalid key size: expected {KEY_SIZE}, got {}",
            key.len()
        ));
    }

    let nonce_bytes = BASE64
        .decode(nonce_b64)
        .map_err(|e| anyhow!("Invalid nonce encoding: {e}"))?;

    if nonce_bytes.len() != NONCE_SIZE {
        return Err(anyhow!("Invalid nonce size"));
    }

    let ciphertext = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| anyhow!("Invalid ciphertext encoding: {e}"))?;

    let key = Key::<Aes256Gcm>::from_slice(key);
    let cipher = Aes256Gcm::new(key);
    let nonce = Nonce::from_slice(&nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|e| anyhow!("Decryption failed: {e}"))
}

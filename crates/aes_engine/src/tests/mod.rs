// Copyright (C) Microsoft Corporation. All rights reserved.

mod cmac_tests;
mod ecb_tests;
mod gcm_tests;

use openssl::symm::Cipher;
use openssl::symm::Crypter;
use openssl::symm::Mode;
use tracing::metadata::LevelFilter;

use super::*;

/// SP 800-38A key, shared by the ECB, CBC, CTR and CMAC vectors.
pub(crate) const NIST_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";

/// SP 800-38A four-block plaintext.
pub(crate) const NIST_PLAINTEXT: &str = concat!(
    "6bc1bee22e409f96e93d7e117393172a",
    "ae2d8a571e03ac9c9eb76fac45af8e51",
    "30c81c46a35ce411e5fbc1191a0a52ef",
    "f69f2445df4f9b17ad2b417be66c3710",
);

/// Installs a test-writer subscriber once per process.
pub(crate) fn init_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_test_writer()
            .with_max_level(LevelFilter::TRACE)
            .with_thread_ids(true)
            .init();
    });
}

pub(crate) fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s).expect("Failed to decode hex")
}

pub(crate) fn key_from_hex(s: &str) -> AesKey {
    AesKey::from_bytes(&unhex(s))
}

/// Deterministic filler bytes.
pub(crate) fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

pub(crate) fn ossl_cipher(mode: AesMode, bits: usize) -> Cipher {
    match (mode, bits) {
        (AesMode::Ecb, 128) => Cipher::aes_128_ecb(),
        (AesMode::Ecb, 192) => Cipher::aes_192_ecb(),
        (AesMode::Ecb, 256) => Cipher::aes_256_ecb(),
        (AesMode::Cbc, 128) => Cipher::aes_128_cbc(),
        (AesMode::Cbc, 192) => Cipher::aes_192_cbc(),
        (AesMode::Cbc, 256) => Cipher::aes_256_cbc(),
        (AesMode::Ctr, 128) => Cipher::aes_128_ctr(),
        (AesMode::Ctr, 192) => Cipher::aes_192_ctr(),
        (AesMode::Ctr, 256) => Cipher::aes_256_ctr(),
        (AesMode::Gcm | AesMode::Gmac, 128) => Cipher::aes_128_gcm(),
        (AesMode::Gcm | AesMode::Gmac, 192) => Cipher::aes_192_gcm(),
        (AesMode::Gcm | AesMode::Gmac, 256) => Cipher::aes_256_gcm(),
        _ => panic!("no OpenSSL cipher for {mode:?}/{bits}"),
    }
}

/// Runs an unpadded OpenSSL cipher over `data`.
pub(crate) fn ossl_crypt(
    cipher: Cipher,
    mode: Mode,
    key: &[u8],
    iv: Option<&[u8]>,
    data: &[u8],
) -> Vec<u8> {
    let mut crypter = Crypter::new(cipher, mode, key, iv).expect("Failed to create crypter");
    crypter.pad(false);
    let mut out = vec![0u8; data.len() + cipher.block_size()];
    let mut len = crypter
        .update(data, &mut out)
        .expect("OpenSSL update failed");
    len += crypter
        .finalize(&mut out[len..])
        .expect("OpenSSL finalize failed");
    out.truncate(len);
    out
}

/// Encrypts `input` through a streaming context, `chunk` bytes per update.
pub(crate) fn stream_encrypt(
    mechanism: &AesMechanism,
    key: &AesKey,
    input: &[u8],
    chunk: usize,
) -> Vec<u8> {
    let mut ctx = Encrypter::encrypt_init(AesModeAlgo::new(mechanism.clone()), key)
        .expect("Failed to init encryption");
    let mut output = Vec::new();
    for piece in input.chunks(chunk) {
        output.extend(Encrypter::update_vec(&mut ctx, piece).expect("Failed to update"));
    }
    output.extend(ctx.finish_vec().expect("Failed to finish"));
    output
}

/// Decrypts `input` through a streaming context, `chunk` bytes per update.
pub(crate) fn stream_decrypt(
    mechanism: &AesMechanism,
    key: &AesKey,
    input: &[u8],
    chunk: usize,
) -> Result<Vec<u8>, AesEngineError> {
    let mut ctx = Decrypter::decrypt_init(AesModeAlgo::new(mechanism.clone()), key)?;
    let mut output = Vec::new();
    for piece in input.chunks(chunk) {
        output.extend(Decrypter::update_vec(&mut ctx, piece)?);
    }
    output.extend(ctx.finish_vec()?);
    Ok(output)
}

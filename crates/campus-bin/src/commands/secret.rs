// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` and `gen-secret` commands.

use std::io::BufRead;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use campus_api::{Argon2Hasher, PasswordHasher};
use rand::RngCore;

use crate::cli::{Cli, GenSecretArgs, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Smallest accepted secret size in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Prints an Argon2id PHC hash of the given password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match (args.stdin, args.password) {
        (true, _) => read_password_line(std::io::stdin().lock())?,
        (false, Some(password)) => password,
        (false, None) => return Err(BinError::config("No password given")),
    };

    if password.is_empty() {
        return Err(BinError::config("Password cannot be empty"));
    }

    let hasher = Argon2Hasher::new(Default::default())?;
    println!("{}", hasher.hash(&password)?);

    Ok(())
}

/// Prints a random URL-safe base64 secret suitable for token signing.
pub fn gen_secret(_cli: &Cli, args: GenSecretArgs) -> BinResult<()> {
    println!("{}", generate_secret(args.bytes)?);
    Ok(())
}

/// Generates `bytes` random bytes encoded as unpadded URL-safe base64.
pub fn generate_secret(bytes: usize) -> BinResult<String> {
    if bytes < MIN_SECRET_BYTES {
        return Err(BinError::config(format!(
            "Secret must be at least {MIN_SECRET_BYTES} bytes"
        )));
    }

    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

fn read_password_line(mut reader: impl BufRead) -> BinResult<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

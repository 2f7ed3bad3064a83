#![no_main]

use libfuzzer_sys::fuzz_target;
use sigil_core::crypto::EncryptedBlob;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as an encrypted backup-phrase blob.
    // EncryptedBlob::from_bytes must never panic, only return Ok or Err.
    if let Ok(blob) = EncryptedBlob::from_bytes(data) {
        // Accepted blobs must survive a serialize/parse round trip
        let bytes = blob.to_bytes();
        let _ = EncryptedBlob::from_bytes(&bytes);
    }
});

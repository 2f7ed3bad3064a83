#![no_main]

use libfuzzer_sys::fuzz_target;
use sigil_core::keys::Keychain;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as an extended-key string.
    // Keychain::from_base58 must never panic, only return Ok or Err.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(keychain) = Keychain::from_base58(s) {
            // Parsed keychains must re-encode without panicking
            let _ = keychain.to_base58();
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use sigil_core::seed::parse_backup_phrase;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a UTF-8 string, then as a backup phrase.
    // parse_backup_phrase must never panic, only return Ok or Err.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_backup_phrase(s);
    }
});

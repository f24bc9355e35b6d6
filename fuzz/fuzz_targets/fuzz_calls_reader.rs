#![no_main]

use std::io::Cursor;

use calls2bed::calls::Reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The streaming reader must never panic, whatever the input bytes
    let mut reader = Reader::new(Cursor::new(data));
    if let Ok(header) = reader.read_header() {
        let n = header.sample_count();
        let mut genotypes = Vec::new();
        while let Ok(Some(_)) = reader.next_marker(n, &mut genotypes) {}
    }
});

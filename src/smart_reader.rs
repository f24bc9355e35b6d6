use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Open a calls file, transparently peeling off GZIP/BGZF layers to expose
/// the underlying text stream. `-` reads from standard input.
///
/// Calls exports are commonly shipped gzipped; nested members and BGZF are
/// handled by `MultiGzDecoder`.
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead + Send>> {
    let mut reader: Box<dyn BufRead + Send> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };

    // Limit unwrap depth to avoid looping on malformed inputs
    let mut depth = 0;
    const MAX_DEPTH: usize = 4;

    while depth < MAX_DEPTH {
        let is_gzip = {
            let buf = reader.fill_buf()?;
            // GZIP magic: 1f 8b
            buf.len() >= 2 && buf[0] == 0x1f && buf[1] == 0x8b
        };

        if !is_gzip {
            break;
        }

        tracing::debug!("detected gzip layer");
        reader = Box::new(BufReader::new(MultiGzDecoder::new(reader)));
        depth += 1;
    }

    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::{Read, Write};

    #[test]
    fn reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.txt");
        std::fs::write(&path, "id\tS1\n").unwrap();

        let mut reader = open_input(&path).unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "id\tS1\n");
    }

    #[test]
    fn unwraps_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.txt.gz");

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"id\tS1\nAX-1\t2\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let mut reader = open_input(&path).unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "id\tS1\nAX-1\t2\n");
    }
}

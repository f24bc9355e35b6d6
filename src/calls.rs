use std::io::{self, BufRead};

use thiserror::Error;

/// Two-bit genotype code used by the PLINK binary container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Genotype {
    /// Homozygous for the first allele.
    HomozygousFirst,
    /// Missing call.
    Missing,
    /// Heterozygous.
    Heterozygous,
    /// Homozygous for the second allele.
    HomozygousSecond,
}

impl Genotype {
    /// The on-disk two-bit encoding.
    pub const fn bits(self) -> u8 {
        match self {
            Self::HomozygousFirst => 0b00,
            Self::Missing => 0b01,
            Self::Heterozygous => 0b10,
            Self::HomozygousSecond => 0b11,
        }
    }

    /// Inverse of [`Genotype::bits`]. Only the low two bits are inspected.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::HomozygousFirst,
            0b01 => Self::Missing,
            0b10 => Self::Heterozygous,
            _ => Self::HomozygousSecond,
        }
    }
}

/// Map one raw call token to its genotype code.
///
/// Total: any token other than `"0"`, `"1"`, or `"2"` resolves to a missing
/// call rather than an error.
pub fn parse_call(token: &str) -> Genotype {
    match token {
        "0" => Genotype::HomozygousFirst,
        "1" => Genotype::Heterozygous,
        "2" => Genotype::HomozygousSecond,
        _ => Genotype::Missing,
    }
}

/// Sample identifiers from the column-header line, in column order.
///
/// The column order is the sample order everywhere downstream: the `.fam`
/// rows and the bit positions inside each packed `.bed` row both follow it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Header {
    samples: Vec<String>,
}

impl Header {
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Streaming reader over a genotype calls table.
pub struct Reader<R> {
    inner: R,
    line: u64,
    buf: String,
}

impl<R> Reader<R>
where
    R: BufRead,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
        }
    }

    /// Skip leading `#` comment lines and parse the column header.
    ///
    /// The first tab-delimited field of the header line labels the marker-id
    /// column and is discarded; every following field is one sample
    /// identifier. End of input before any non-comment line, or an empty
    /// first non-comment line, yields a header with zero samples.
    pub fn read_header(&mut self) -> Result<Header, ParseError> {
        loop {
            self.buf.clear();
            match self.inner.read_line(&mut self.buf) {
                Ok(0) => return Ok(Header::default()),
                Ok(_) => {
                    self.line += 1;
                    if self.buf.starts_with('#') {
                        continue;
                    }
                    let trimmed = self.buf.trim_end_matches(['\n', '\r']);
                    let mut fields = trimmed.split('\t');
                    fields.next();
                    let samples = fields.map(str::to_string).collect();
                    return Ok(Header { samples });
                }
                Err(e) => return Err(self.error(ParseErrorKind::Io(e))),
            }
        }
    }

    /// Read the next marker row, filling `genotypes` with exactly
    /// `n_samples` codes.
    ///
    /// Returns the marker identifier, or `None` at end of input. Fields
    /// beyond `n_samples` are ignored; a row with fewer fields fails with
    /// [`ParseErrorKind::TruncatedRow`].
    pub fn next_marker(
        &mut self,
        n_samples: usize,
        genotypes: &mut Vec<Genotype>,
    ) -> Result<Option<&str>, ParseError> {
        self.buf.clear();
        match self.inner.read_line(&mut self.buf) {
            Ok(0) => return Ok(None),
            Ok(_) => self.line += 1,
            Err(e) => return Err(self.error(ParseErrorKind::Io(e))),
        }

        let trimmed = self.buf.trim_end_matches(['\n', '\r']);
        let mut fields = trimmed.split('\t');
        let marker_id = fields.next().unwrap_or_default();
        if marker_id.is_empty() {
            return Err(self.error(ParseErrorKind::MissingMarkerId));
        }

        genotypes.clear();
        for found in 0..n_samples {
            match fields.next() {
                Some(token) => genotypes.push(parse_call(token)),
                None => {
                    return Err(self.error(ParseErrorKind::TruncatedRow {
                        expected: n_samples,
                        found,
                    }));
                }
            }
        }

        Ok(Some(marker_id))
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            kind,
        }
    }
}

/// Errors raised while parsing a calls table.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: u64,
    #[source]
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("data line has no marker identifier")]
    MissingMarkerId,
    #[error("expected {expected} genotype fields, found {found}")]
    TruncatedRow { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_mapping_is_total() {
        assert_eq!(parse_call("0"), Genotype::HomozygousFirst);
        assert_eq!(parse_call("1"), Genotype::Heterozygous);
        assert_eq!(parse_call("2"), Genotype::HomozygousSecond);
        for token in ["9", "", "NA", "01", "-1", "AB", "2 "] {
            assert_eq!(parse_call(token), Genotype::Missing, "token {token:?}");
        }
    }

    #[test]
    fn genotype_bits_round_trip() {
        for genotype in [
            Genotype::HomozygousFirst,
            Genotype::Missing,
            Genotype::Heterozygous,
            Genotype::HomozygousSecond,
        ] {
            assert_eq!(Genotype::from_bits(genotype.bits()), genotype);
        }
    }

    #[test]
    fn header_skips_comments() {
        let data = b"#AxiomGT1 run\n#chip type\nprobeset_id\tS1\tS2\nAX-1\t0\t1\n";
        let mut reader = Reader::new(&data[..]);
        let header = reader.read_header().unwrap();
        assert_eq!(header.samples(), ["S1", "S2"]);
    }

    #[test]
    fn empty_input_yields_zero_samples() {
        let mut reader = Reader::new(&b""[..]);
        assert_eq!(reader.read_header().unwrap().sample_count(), 0);

        let mut reader = Reader::new(&b"#only comments\n"[..]);
        assert_eq!(reader.read_header().unwrap().sample_count(), 0);
    }

    #[test]
    fn blank_line_terminates_header_scan() {
        let data = b"#comment\n\nAX-1\t0\n";
        let mut reader = Reader::new(&data[..]);
        let header = reader.read_header().unwrap();
        assert_eq!(header.sample_count(), 0);
    }

    #[test]
    fn marker_rows_parse_in_order() {
        let data = b"id\tS1\tS2\tS3\nAX-1\t0\t1\t2\nAX-2\t9\t2\t0\n";
        let mut reader = Reader::new(&data[..]);
        let n = reader.read_header().unwrap().sample_count();
        let mut genotypes = Vec::new();

        let id = reader.next_marker(n, &mut genotypes).unwrap().unwrap().to_string();
        assert_eq!(id, "AX-1");
        assert_eq!(
            genotypes,
            [
                Genotype::HomozygousFirst,
                Genotype::Heterozygous,
                Genotype::HomozygousSecond,
            ]
        );

        let id = reader.next_marker(n, &mut genotypes).unwrap().unwrap().to_string();
        assert_eq!(id, "AX-2");
        assert_eq!(
            genotypes,
            [
                Genotype::Missing,
                Genotype::HomozygousSecond,
                Genotype::HomozygousFirst,
            ]
        );

        assert!(reader.next_marker(n, &mut genotypes).unwrap().is_none());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let data = b"AX-1\t0\t1\t2\t2\n";
        let mut reader = Reader::new(&data[..]);
        let mut genotypes = Vec::new();
        let id = reader.next_marker(2, &mut genotypes).unwrap().unwrap().to_string();
        assert_eq!(id, "AX-1");
        assert_eq!(genotypes.len(), 2);
    }

    #[test]
    fn missing_marker_id_is_an_error() {
        for data in [&b"\t0\t1\n"[..], &b"\n"[..]] {
            let mut reader = Reader::new(data);
            let mut genotypes = Vec::new();
            let err = reader.next_marker(2, &mut genotypes).unwrap_err();
            assert!(matches!(err.kind, ParseErrorKind::MissingMarkerId));
            assert_eq!(err.line, 1);
        }
    }

    #[test]
    fn truncated_row_is_an_error() {
        let data = b"AX-1\t0\t1\n";
        let mut reader = Reader::new(&data[..]);
        let mut genotypes = Vec::new();
        let err = reader.next_marker(3, &mut genotypes).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::TruncatedRow {
                expected: 3,
                found: 2,
            }
        ));
    }
}

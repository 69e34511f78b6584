//! Shared decode-on-read support for the csv and fixed-width sources: a
//! dataset's declared `encoding` (default `utf-8`) is resolved against the
//! WHATWG encoding labels `encoding_rs` recognizes, and the source file is
//! wrapped in a transcoding reader so every cell the rest of the pipeline
//! sees is already valid UTF-8. XLSX is exempt — `calamine` hands back
//! already-decoded strings from the workbook's own internal encoding.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use sirad_core::{Result, SiradError};

pub fn open_decoded(path: &Path, dataset: &str, encoding_label: &str) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).map_err(|e| SiradError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let encoding = Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| SiradError::Layout {
        dataset: dataset.to_string(),
        message: format!("unrecognized encoding '{encoding_label}'"),
    })?;
    let decoding: Box<dyn Read> = Box::new(
        DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .build(file),
    );
    Ok(BufReader::new(decoding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Write as _};

    #[test]
    fn decodes_latin1_source_to_utf8() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        // "Jos\xe9" in ISO-8859-1, i.e. "Jos\u{e9}" once decoded.
        tmp.write_all(b"Jos\xe9\n").unwrap();

        let mut reader = open_decoded(tmp.path(), "people", "iso-8859-1").unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "Jos\u{e9}\n");
    }

    #[test]
    fn unknown_encoding_label_is_a_layout_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let err = open_decoded(tmp.path(), "people", "not-a-real-encoding").unwrap_err();
        assert!(matches!(err, SiradError::Layout { .. }));
    }
}

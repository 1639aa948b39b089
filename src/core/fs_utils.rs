//! File system utility helpers (encoding-aware text readers, etc.)
use crate::core::errors::{ImportError, ImportResult};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1251};
use std::fs;
use std::path::Path;

/// Читает текстовый файл с fallback по кодировкам.
///
/// Порядок: BOM (UTF-8/UTF-16) -> строгий UTF-8 -> Windows-1251.
/// Инструменты под Windows нередко пишут отчеты в UTF-16 или в
/// локальной однобайтовой кодировке, исходники тоже встречаются всякие.
pub fn read_text_file(path: &Path) -> ImportResult<String> {
    let file_bytes = fs::read(path)?;
    decode_text_bytes(&file_bytes, path)
}

fn decode_text_bytes(file_bytes: &[u8], path: &Path) -> ImportResult<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(file_bytes) {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(&file_bytes[bom_len..]);
        if !had_errors {
            tracing::debug!("Decoded {} as {} (BOM)", path.display(), encoding.name());
            return Ok(decoded.into_owned());
        }
        return Err(ImportError::Encoding(path.to_path_buf()));
    }

    let (decoded, _, had_errors) = UTF_8.decode(file_bytes);
    if !had_errors {
        return Ok(decoded.into_owned());
    }

    let (decoded, _, had_errors) = WINDOWS_1251.decode(file_bytes);
    if !had_errors {
        tracing::debug!("Decoded {} as Windows-1251", path.display());
        return Ok(decoded.into_owned());
    }

    // Последний шанс: UTF-8 с заменой ошибочных символов
    tracing::warn!("Used UTF-8 with error replacement for report: {}", path.display());
    let (decoded, _, _) = UTF_8.decode(file_bytes);
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_decode_plain_utf8() {
        let content = decode_text_bytes(b"<results/>", &PathBuf::from("r.xml")).unwrap();
        assert_eq!(content, "<results/>");
    }

    #[test]
    fn test_decode_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<results/>".as_bytes());
        let content = decode_text_bytes(&bytes, &PathBuf::from("r.xml")).unwrap();
        assert_eq!(content, "<results/>");
    }

    #[test]
    fn test_decode_utf16_le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<results/>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let content = decode_text_bytes(&bytes, &PathBuf::from("r.xml")).unwrap();
        assert_eq!(content, "<results/>");
    }

    #[test]
    fn test_decode_windows_1251() {
        // "ошибка" в Windows-1251
        let bytes = [0xEE, 0xF8, 0xE8, 0xE1, 0xEA, 0xE0];
        let content = decode_text_bytes(&bytes, &PathBuf::from("r.xml")).unwrap();
        assert_eq!(content, "ошибка");
    }
}

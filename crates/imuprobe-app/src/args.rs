//! Parsers for register arguments such as `0x1D:14` and `0x4E=0F`.

use std::str::FromStr;

/// Hex with a `0x` prefix, decimal otherwise.
pub fn parse_register(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    }
    .map_err(|e| format!("bad register '{s}': {e}"))?;
    if value > 0x7F {
        return Err(format!("register 0x{value:02X} is outside 0x00..=0x7F"));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub register: u8,
    pub length: usize,
}

impl FromStr for ReadRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (register, length) = match s.split_once(':') {
            Some((register, length)) => {
                let length = length
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| format!("bad length '{length}': {e}"))?;
                (register, length)
            }
            None => (s, 1),
        };
        Ok(Self {
            register: parse_register(register)?,
            length,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub register: u8,
    pub data: Vec<u8>,
}

impl FromStr for WriteRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (register, data) = s
            .split_once('=')
            .ok_or_else(|| format!("expected REG=HEX, got '{s}'"))?;
        let data = data.trim();
        let data = data.strip_prefix("0x").unwrap_or(data);
        let data = hex::decode(data).map_err(|e| format!("bad payload '{data}': {e}"))?;
        Ok(Self {
            register: parse_register(register)?,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_forms() {
        assert_eq!(parse_register("0x75"), Ok(0x75));
        assert_eq!(parse_register("29"), Ok(29));
        assert!(parse_register("0x80").is_err());
        assert!(parse_register("zz").is_err());
    }

    #[test]
    fn test_read_request() {
        assert_eq!(
            "0x1D:14".parse::<ReadRequest>(),
            Ok(ReadRequest { register: 0x1D, length: 14 })
        );
        assert_eq!(
            "0x75".parse::<ReadRequest>(),
            Ok(ReadRequest { register: 0x75, length: 1 })
        );
        assert!("0x75:x".parse::<ReadRequest>().is_err());
    }

    #[test]
    fn test_write_request() {
        assert_eq!(
            "0x4E=0F".parse::<WriteRequest>(),
            Ok(WriteRequest { register: 0x4E, data: vec![0x0F] })
        );
        assert_eq!(
            "0x20=0x0102".parse::<WriteRequest>(),
            Ok(WriteRequest { register: 0x20, data: vec![0x01, 0x02] })
        );
        assert!("0x20".parse::<WriteRequest>().is_err());
        assert!("0x20=0".parse::<WriteRequest>().is_err());
    }
}

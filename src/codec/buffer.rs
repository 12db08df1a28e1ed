//! 信封读写缓冲
//!
//! 小端序的原语读写。读侧的每次访问都做边界检查，
//! 数据在声明字段读完前结束时报 `TruncatedEnvelope`。

use crate::core::error::CodecError;

/// 信封写入器
#[derive(Debug, Default)]
pub struct EnvelopeWriter {
    buf: Vec<u8>,
}

impl EnvelopeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// 写入 u32 长度前缀的 UTF-8 字符串
    pub fn write_str(&mut self, v: &str) {
        self.write_u32(v.len() as u32);
        self.buf.extend_from_slice(v.as_bytes());
    }

    /// 写入 u32 长度前缀的字节串
    pub fn write_bytes(&mut self, v: &[u8]) {
        self.write_u32(v.len() as u32);
        self.buf.extend_from_slice(v);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// 信封读取器
#[derive(Debug)]
pub struct EnvelopeReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> EnvelopeReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::TruncatedEnvelope(format!(
                "need {} bytes at offset {}, {} remaining",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(buf))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(buf))
    }

    /// 读取 u32 长度前缀的 UTF-8 字符串
    pub fn read_str(&mut self) -> Result<String, CodecError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| CodecError::InvalidData(format!("invalid UTF-8 string: {}", e)))
    }

    /// 读取 u32 长度前缀的字节串
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_round_trip() {
        let mut writer = EnvelopeWriter::new();
        writer.write_u8(7);
        writer.write_u32(1234);
        writer.write_i64(-5);
        writer.write_f64(1.5);
        writer.write_str("hello");
        writer.write_bool(true);
        let bytes = writer.into_bytes();

        let mut reader = EnvelopeReader::new(&bytes);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_u32().unwrap(), 1234);
        assert_eq!(reader.read_i64().unwrap(), -5);
        assert_eq!(reader.read_f64().unwrap(), 1.5);
        assert_eq!(reader.read_str().unwrap(), "hello");
        assert!(reader.read_bool().unwrap());
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_truncated_read() {
        let mut writer = EnvelopeWriter::new();
        writer.write_u16(1);
        let bytes = writer.into_bytes();

        let mut reader = EnvelopeReader::new(&bytes);
        assert!(matches!(
            reader.read_u32(),
            Err(CodecError::TruncatedEnvelope(_))
        ));
    }

    #[test]
    fn test_truncated_string() {
        let mut writer = EnvelopeWriter::new();
        writer.write_u32(100);
        let bytes = writer.into_bytes();

        let mut reader = EnvelopeReader::new(&bytes);
        assert!(matches!(
            reader.read_str(),
            Err(CodecError::TruncatedEnvelope(_))
        ));
    }
}

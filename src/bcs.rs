/// BCS writer helpers for the engine's canonical argument encoding.
pub fn push_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

pub fn push_u8(buf: &mut Vec<u8>, value: u8) {
    buf.push(value);
}

pub fn push_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_u128(buf: &mut Vec<u8>, value: u128) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(u8::from(value));
}

/// Length-prefixed byte sequence (`vector<u8>`).
pub fn push_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    push_len(buf, bytes.len());
    buf.extend_from_slice(bytes);
}

pub fn push_str(buf: &mut Vec<u8>, text: &str) {
    push_bytes(buf, text.as_bytes());
}

/// Fixed-width 32-byte address, no length prefix.
pub fn push_address(buf: &mut Vec<u8>, address: &[u8; 32]) {
    buf.extend_from_slice(address);
}

pub fn push_len(buf: &mut Vec<u8>, len: usize) {
    push_uleb128(buf, len as u64);
}

pub fn push_none(buf: &mut Vec<u8>) {
    buf.push(0);
}

pub fn push_some_tag(buf: &mut Vec<u8>) {
    buf.push(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_boundaries() {
        let cases: [(u64, &[u8]); 5] = [
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (16_384, &[0x80, 0x80, 0x01]),
        ];
        for (value, expected) in cases {
            let mut buf = Vec::new();
            push_uleb128(&mut buf, value);
            assert_eq!(buf, expected, "uleb128({value})");
        }
    }

    #[test]
    fn integers_are_little_endian() {
        let mut buf = Vec::new();
        push_u64(&mut buf, 0x0102_0304);
        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01, 0, 0, 0, 0]);

        let mut buf = Vec::new();
        push_u128(&mut buf, 1);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf[0], 1);
        assert!(buf[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn strings_carry_length_prefix() {
        let mut buf = Vec::new();
        push_str(&mut buf, "hi");
        assert_eq!(buf, vec![0x02, b'h', b'i']);

        let long = "x".repeat(200);
        let mut buf = Vec::new();
        push_str(&mut buf, &long);
        assert_eq!(&buf[..2], &[0xc8, 0x01]);
        assert_eq!(buf.len(), 202);
    }
}

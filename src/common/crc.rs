// src/common/crc.rs

use super::error::RbrError;
use crc::{Algorithm, Crc};

/// CRC algorithm trailing bulk `readdata` transfers (CRC-16/CCITT-FALSE).
/// Polynomial: 0x1021
/// Initial Value: 0xFFFF
/// Input Reflected: false (MSB-first bit processing)
/// Output Reflected: false
/// Final XOR: 0x0000
/// Check Value: 0x29B1 (for "123456789")
pub const BULK_CRC: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x1021,
    init: 0xFFFF,
    refin: false,
    refout: false,
    xorout: 0x0000,
    check: 0x29B1,
    residue: 0x0000,
};

const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&BULK_CRC);

/// Number of CRC bytes following a bulk transfer payload on the wire.
pub const WIRE_CRC_LEN: usize = 2;

/// Calculates the CRC-16/CCITT of `data`.
#[inline]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Encodes a CRC the way the instrument sends it: big-endian, MSB first.
pub fn encode_crc_wire(crc_value: u16) -> [u8; WIRE_CRC_LEN] {
    crc_value.to_be_bytes()
}

/// Decodes the two CRC bytes received after a bulk transfer payload.
///
/// The bytes arrive big-endian; the value is byte-swapped into host order before comparison.
pub fn decode_crc_wire(crc_bytes: [u8; WIRE_CRC_LEN]) -> u16 {
    u16::from_le_bytes(crc_bytes).swap_bytes()
}

/// Verifies a bulk transfer payload against the CRC bytes that followed it on the wire.
///
/// # Returns
///
/// * `Ok(())` if the CRC is valid.
/// * `Err(RbrError::ChecksumMismatch)` if the CRCs don't match.
pub fn verify_payload_crc<E>(payload: &[u8], crc_bytes: [u8; WIRE_CRC_LEN]) -> Result<(), RbrError<E>>
where
    E: core::fmt::Debug,
{
    let calculated = calculate_crc16(payload);
    let expected = decode_crc_wire(crc_bytes);

    if calculated == expected {
        Ok(())
    } else {
        Err(RbrError::ChecksumMismatch { expected, calculated })
    }
}

/// Verifies a buffer holding a payload immediately followed by its wire CRC.
///
/// * `Err(RbrError::InvalidFormat)` if the buffer is too short to hold a CRC.
pub fn verify_packet_crc<E>(packet_with_crc: &[u8]) -> Result<(), RbrError<E>>
where
    E: core::fmt::Debug,
{
    if packet_with_crc.len() < WIRE_CRC_LEN {
        return Err(RbrError::InvalidFormat);
    }
    let (payload, crc_bytes) = packet_with_crc.split_at(packet_with_crc.len() - WIRE_CRC_LEN);
    verify_payload_crc(payload, [crc_bytes[0], crc_bytes[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockIoError;

    fn with_crc(payload: &[u8]) -> Vec<u8> {
        let mut packet = payload.to_vec();
        packet.extend_from_slice(&encode_crc_wire(calculate_crc16(payload)));
        packet
    }

    #[test]
    fn test_check_value() {
        assert_eq!(calculate_crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_payload_is_init_value() {
        assert_eq!(calculate_crc16(b""), 0xFFFF);
    }

    #[test]
    fn test_wire_bytes_are_big_endian() {
        assert_eq!(encode_crc_wire(0x29B1), [0x29, 0xB1]);
        assert_eq!(decode_crc_wire([0x29, 0xB1]), 0x29B1);
    }

    #[test]
    fn test_valid_packet_accepted() {
        let payloads: [&[u8]; 4] = [
            b"",
            b"\x00",
            b"readdata dataset = 1, size = 64, offset = 0",
            &[0xFF, 0x00, 0x7F, 0x80, 0x01, 0xFE, 0x55, 0xAA, 0x12, 0x34],
        ];
        for payload in payloads {
            let packet = with_crc(payload);
            assert!(
                verify_packet_crc::<MockIoError>(&packet).is_ok(),
                "packet {:02x?} rejected",
                packet
            );
        }
    }

    #[test]
    fn test_single_bit_flip_rejected_everywhere() {
        let payload = [0x00, 0x01, 0x02, 0x03, 0x10, 0x20, 0x40, 0x80, 0xC3, 0x3C];
        let packet = with_crc(&payload);

        for byte in 0..packet.len() {
            for bit in 0..8 {
                let mut corrupted = packet.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(
                    matches!(
                        verify_packet_crc::<MockIoError>(&corrupted),
                        Err(RbrError::ChecksumMismatch { .. })
                    ),
                    "flip of bit {} in byte {} was accepted",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_mismatch_reports_both_values() {
        let result = verify_payload_crc::<MockIoError>(b"123456789", [0x29, 0xB2]);
        assert!(matches!(
            result,
            Err(RbrError::ChecksumMismatch { expected: 0x29B2, calculated: 0x29B1 })
        ));
    }

    #[test]
    fn test_too_short_packet() {
        assert!(matches!(verify_packet_crc::<MockIoError>(&[0x29]), Err(RbrError::InvalidFormat)));
        assert!(matches!(verify_packet_crc::<MockIoError>(b""), Err(RbrError::InvalidFormat)));
    }
}

//! Minimal MP4 container used as a video placeholder.
//!
//! Layout: `ftyp` (isom, compatible with mp42) + `moov` holding a single
//! `mvhd` with zero duration + an empty `free` box. Players open it as a
//! zero-length movie; it is never empty on disk.

const TIMESCALE: u32 = 1000;

fn push_box(out: &mut Vec<u8>, kind: &[u8; 4], payload: &[u8]) {
    let size = (8 + payload.len()) as u32;
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
}

fn ftyp() -> Vec<u8> {
    let mut payload = Vec::with_capacity(16);
    payload.extend_from_slice(b"isom");
    payload.extend_from_slice(&0x200u32.to_be_bytes());
    payload.extend_from_slice(b"isom");
    payload.extend_from_slice(b"mp42");
    payload
}

/// Version 0 movie header: 100-byte payload.
fn mvhd() -> Vec<u8> {
    let mut p = Vec::with_capacity(100);
    p.extend_from_slice(&0u32.to_be_bytes()); // version + flags
    p.extend_from_slice(&0u32.to_be_bytes()); // creation time
    p.extend_from_slice(&0u32.to_be_bytes()); // modification time
    p.extend_from_slice(&TIMESCALE.to_be_bytes());
    p.extend_from_slice(&0u32.to_be_bytes()); // duration
    p.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate 1.0
    p.extend_from_slice(&0x0100u16.to_be_bytes()); // volume 1.0
    p.extend_from_slice(&[0u8; 10]); // reserved
    let matrix: [u32; 9] = [0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000];
    for v in matrix {
        p.extend_from_slice(&v.to_be_bytes());
    }
    p.extend_from_slice(&[0u8; 24]); // pre_defined
    p.extend_from_slice(&1u32.to_be_bytes()); // next track id
    p
}

/// Bytes of the placeholder container.
pub fn minimal_mp4() -> Vec<u8> {
    let mut moov = Vec::new();
    push_box(&mut moov, b"mvhd", &mvhd());

    let mut out = Vec::new();
    push_box(&mut out, b"ftyp", &ftyp());
    push_box(&mut out, b"moov", &moov);
    push_box(&mut out, b"free", &[]);
    out
}

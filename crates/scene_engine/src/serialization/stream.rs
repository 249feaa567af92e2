//! Little-endian primitive encoding

use std::io::{Read, Write};

use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Quat, Quaternion, Transform, Vec3};

/// Longest string accepted when reading, guards against corrupt lengths
const MAX_STRING_LEN: u32 = 16 * 1024 * 1024;

pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> SceneResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u32<R: Read>(reader: &mut R) -> SceneResult<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> SceneResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u64<R: Read>(reader: &mut R) -> SceneResult<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn write_f32<W: Write>(writer: &mut W, value: f32) -> SceneResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_f32<R: Read>(reader: &mut R) -> SceneResult<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

pub fn write_bool<W: Write>(writer: &mut W, value: bool) -> SceneResult<()> {
    writer.write_all(&[u8::from(value)])?;
    Ok(())
}

pub fn read_bool<R: Read>(reader: &mut R) -> SceneResult<bool> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    match buf[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(SceneError::CorruptedData(format!("invalid bool byte {other}"))),
    }
}

/// Length-prefixed UTF-8
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> SceneResult<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| SceneError::CorruptedData(format!("string of {} bytes is too long", value.len())))?;
    write_u32(writer, len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

pub fn read_string<R: Read>(reader: &mut R) -> SceneResult<String> {
    let len = read_u32(reader)?;
    if len > MAX_STRING_LEN {
        return Err(SceneError::CorruptedData(format!("string length {len} exceeds limit")));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| SceneError::CorruptedData(format!("invalid UTF-8 string: {e}")))
}

pub fn write_vec3<W: Write>(writer: &mut W, v: &Vec3) -> SceneResult<()> {
    write_f32(writer, v.x)?;
    write_f32(writer, v.y)?;
    write_f32(writer, v.z)
}

pub fn read_vec3<R: Read>(reader: &mut R) -> SceneResult<Vec3> {
    let x = read_f32(reader)?;
    let y = read_f32(reader)?;
    let z = read_f32(reader)?;
    Ok(Vec3::new(x, y, z))
}

/// Rotation as raw (x, y, z, w)
pub fn write_quat<W: Write>(writer: &mut W, q: &Quat) -> SceneResult<()> {
    let coords = q.quaternion().coords;
    for value in coords.iter() {
        write_f32(writer, *value)?;
    }
    Ok(())
}

/// Reads raw components without renormalizing, so stored rotations come
/// back bit-identical
pub fn read_quat<R: Read>(reader: &mut R) -> SceneResult<Quat> {
    let x = read_f32(reader)?;
    let y = read_f32(reader)?;
    let z = read_f32(reader)?;
    let w = read_f32(reader)?;
    Ok(Quat::new_unchecked(Quaternion::new(w, x, y, z)))
}

pub fn write_transform<W: Write>(writer: &mut W, transform: &Transform) -> SceneResult<()> {
    write_vec3(writer, &transform.position)?;
    write_quat(writer, &transform.rotation)?;
    write_vec3(writer, &transform.scale)
}

pub fn read_transform<R: Read>(reader: &mut R) -> SceneResult<Transform> {
    let position = read_vec3(reader)?;
    let rotation = read_quat(reader)?;
    let scale = read_vec3(reader)?;
    Ok(Transform { position, rotation, scale })
}

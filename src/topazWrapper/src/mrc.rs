
// MRC file (from the Medical Research Council, in the UK)
// https://en.wikipedia.org/wiki/MRC_(file_format)

// format specification:
// https://www.ccpem.ac.uk/mrc_format/mrc2014.php

// Only 2D images are supported here: galleries of particles and the composite grids built from them.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt, BE, LE};
use tracing::{debug, warn};

use crate::micrograph::Micrograph;


const HEADER_BYTES: usize = 1024;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	I8,
	I16,
	F32,
	U16
}

impl Mode {

	fn from_code(code: i32) -> Result<Self> {
		match code {
			0 => Ok(Mode::I8),
			1 => Ok(Mode::I16),
			2 => Ok(Mode::F32),
			6 => Ok(Mode::U16),
			_ => bail!("Unsupported MRC mode: {}", code)
		}
	}

	fn voxel_bytes(&self) -> usize {
		match self {
			Mode::I8 => 1,
			Mode::I16 | Mode::U16 => 2,
			Mode::F32 => 4
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	pub nx: u32,
	pub ny: u32,
	pub nz: u32,
	pub mode: Mode,
	pub nsymbt: u32,
	pub big_endian: bool
}


pub fn read(path: impl AsRef<Path>) -> Result<Micrograph> {
	let path = path.as_ref();
	let bytes = fs::read(path)
		.context(format!("Failed to read MRC file: {}", path.to_string_lossy()))?;
	decode(&bytes)
		.context(format!("Failed to decode MRC file: {}", path.to_string_lossy()))
}


/// Reads the first section of an MRC file as a 2D image.
pub fn decode(bytes: &[u8]) -> Result<Micrograph> {

	if bytes.len() < HEADER_BYTES {
		bail!("File too short for an MRC header: {} bytes", bytes.len());
	}

	// the machine stamp (word 54) tells us the byte order,
	// but lots of writers leave it blank, so assume little-endian then
	let big_endian = match bytes[212] {
		0x11 => true,
		0x44 | 0x41 => false,
		_ => {
			debug!("No MRC machine stamp, assuming little-endian");
			false
		}
	};

	let header = if big_endian {
		read_header::<BE>(bytes)?
	} else {
		read_header::<LE>(bytes)?
	};

	if header.nz > 1 {
		warn!("MRC file has {} sections, using only the first one", header.nz);
	}

	let num_pixels = (header.nx as usize)*(header.ny as usize);
	let start = HEADER_BYTES + header.nsymbt as usize;
	let end = start + num_pixels*header.mode.voxel_bytes();
	if bytes.len() < end {
		bail!("MRC data truncated: expected at least {} bytes, found {}", end, bytes.len());
	}
	let data = &bytes[start .. end];

	let pixels = if header.big_endian {
		read_pixels::<BE>(data, header.mode, num_pixels)?
	} else {
		read_pixels::<LE>(data, header.mode, num_pixels)?
	};

	Micrograph::from_pixels(header.nx, header.ny, pixels)
}


fn read_header<B: ByteOrder>(bytes: &[u8]) -> Result<Header> {

	let mut cursor = Cursor::new(bytes);

	// dimensions (words 1-3), then the mode (word 4)
	let nx = read_dim::<B>(&mut cursor, "nx")?;
	let ny = read_dim::<B>(&mut cursor, "ny")?;
	let nz = read_dim::<B>(&mut cursor, "nz")?;
	let mode = Mode::from_code(cursor.read_i32::<B>()?)?;

	// size of the extended header (word 24)
	cursor.seek(SeekFrom::Start(4*(24 - 1)))?;
	let nsymbt = cursor.read_i32::<B>()?;
	let nsymbt = u32::try_from(nsymbt)
		.context(format!("Invalid extended header size: {}", nsymbt))?;

	Ok(Header {
		nx,
		ny,
		nz,
		mode,
		nsymbt,
		big_endian: B::read_u16(&[0x12, 0x34]) == 0x1234
	})
}


fn read_dim<B: ByteOrder>(cursor: &mut Cursor<&[u8]>, name: &str) -> Result<u32> {
	let dim = cursor.read_i32::<B>()?;
	if dim <= 0 {
		bail!("Invalid MRC dimension {}: {}", name, dim);
	}
	Ok(dim as u32)
}


fn read_pixels<B: ByteOrder>(data: &[u8], mode: Mode, num_pixels: usize) -> Result<Vec<f32>> {
	let mut reader = data;
	let mut pixels = Vec::<f32>::with_capacity(num_pixels);
	for _ in 0 .. num_pixels {
		let v = match mode {
			Mode::I8 => reader.read_i8()? as f32,
			Mode::I16 => reader.read_i16::<B>()? as f32,
			Mode::U16 => reader.read_u16::<B>()? as f32,
			Mode::F32 => reader.read_f32::<B>()?
		};
		pixels.push(v);
	}
	Ok(pixels)
}


/// Writes a 2D image as a little-endian, mode 2 (32-bit float) MRC file.
pub fn write(micrograph: &Micrograph, path: impl AsRef<Path>) -> Result<()> {

	let path = path.as_ref();

	let mut file = File::create(&path)
		.context(format!("Failed to open file for writing: {}", path.to_string_lossy()))?;
	let mut writer = BufWriter::new(&mut file);
	encode(micrograph, &mut writer)
		.context(format!("Failed to write MRC file: {}", path.to_string_lossy()))?;

	// write buffers should be flushed before dropping
	writer.flush()?;

	Ok(())
}


pub fn encode(micrograph: &Micrograph, mut writer: impl Write) -> Result<()> {

	let nx = micrograph.width();
	let ny = micrograph.height();
	let stats = micrograph.stats();

	// first, write the header: it's 256 (4-byte) words, or 1024 bytes total

	// write the dimensions (words 1-3)
	writer.write_u32::<LE>(nx)?;
	writer.write_u32::<LE>(ny)?;
	writer.write_u32::<LE>(1)?;

	// use mode 2: 32 bit float
	writer.write_u32::<LE>(2)?;

	// start indices (words 5-7) are all zero
	writer.write_all(&[0u8; 4*3])?;

	// sampling (words 8-10) matches the dimensions, so the pixel size is 1
	writer.write_u32::<LE>(nx)?;
	writer.write_u32::<LE>(ny)?;
	writer.write_u32::<LE>(1)?;

	// cell dimensions (words 11-13) and angles (words 14-16)
	writer.write_f32::<LE>(nx as f32)?;
	writer.write_f32::<LE>(ny as f32)?;
	writer.write_f32::<LE>(1.0)?;
	for _ in 0 .. 3 {
		writer.write_f32::<LE>(90.0)?;
	}

	// axis mapping (words 17-19): columns, rows, sections = x, y, z
	writer.write_u32::<LE>(1)?;
	writer.write_u32::<LE>(2)?;
	writer.write_u32::<LE>(3)?;

	// density stats (words 20-22)
	writer.write_f32::<LE>(stats.min)?;
	writer.write_f32::<LE>(stats.max)?;
	writer.write_f32::<LE>(stats.mean)?;

	// space group 0 means an image, or image stack (word 23)
	writer.write_u32::<LE>(0)?;

	// we're not using any extra header space, so zero out nsymbt (word 24)
	writer.write_u32::<LE>(0)?;

	// words 25-27 are unused here, word 28 is the format version
	writer.write_all(&[0u8; 4*3])?;
	writer.write_u32::<LE>(20140)?;

	// we're at word 29 now: skip past the origin to word 53
	writer.write_all(&[0u8; 4*(53 - 29)])?;

	// the MAP identifier, then the machine stamp: signal little-endianess
	writer.write_all(b"MAP ")?;
	writer.write_all(&[0x44, 0x44, 0x00, 0x00])?;

	// rms deviation (word 55), then no labels (word 56)
	writer.write_f32::<LE>(stats.stddev)?;
	writer.write_u32::<LE>(0)?;

	// we're at word 57 now: skip to the end of the header (word 257)
	writer.write_all(&[0u8; 4*(257 - 57)])?;

	// write the pixels: y(x) order
	for &v in micrograph.pixels() {
		writer.write_f32::<LE>(v)?;
	}

	Ok(())
}


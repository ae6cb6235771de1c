//! Double Array File format module for reading SPICE DAF files
//!
//! This module provides functionality for reading NAIF's Double Array File (DAF)
//! format, the container underneath SPK kernels.
//!
//! Layout summary: the file is a sequence of 1024-byte records. Record 1 is
//! the file record (ID word, ND, NI, internal name, FWARD, BWARD, FREE, binary
//! format). Records 2..FWARD hold comments. Starting at FWARD, summary records
//! each begin with three doubles (NEXT, PREV, NSUM) followed by NSUM packed
//! summaries; the record after each summary record holds the matching names.
//! Array data is addressed in 1-based double-precision words.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;
use memmap2::Mmap;

use crate::jplephem::errors::{JplephemError, Result};

/// Size of a DAF record (bytes)
pub const RECORD_SIZE: usize = 1024;
/// Size of a double-precision value (bytes)
const DOUBLE_SIZE: usize = 8;
/// Characters of each comment record that carry text
const COMMENT_RECORD_CHARS: usize = 1000;
/// End-of-comments marker
const EOT: u8 = 0x04;
/// Upper bound on summary records walked before giving up
const MAX_SUMMARY_RECORDS: usize = 10_000;

/// DAF file endianness
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// One array descriptor from a summary record
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Array name from the name record, trailing blanks removed
    pub name: String,
    /// The ND double-precision components
    pub doubles: Vec<f64>,
    /// The NI integer components
    pub integers: Vec<i32>,
}

/// Double Array File (DAF) file reader
pub struct DAF {
    /// Path to the DAF file
    pub path: PathBuf,
    /// File version word, e.g. `DAF/SPK`
    pub locidw: String,
    /// Number of double-precision components per summary
    pub nd: u32,
    /// Number of integer components per summary
    pub ni: u32,
    /// Internal file name
    pub ifname: String,
    /// Forward pointer to first summary record
    pub fward: u32,
    /// Backward pointer to last summary record
    pub bward: u32,
    /// First free address
    pub free: u32,
    /// Byte order (endianness)
    pub endian: Endian,
    /// Memory map of the whole file
    map: Mmap,
}

impl DAF {
    /// Open a DAF file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|e| JplephemError::io(&path_buf, e))?;

        // SAFETY: the map is read-only and kernels are not modified while open
        let map = unsafe { Mmap::map(&file) }.map_err(|e| JplephemError::io(&path_buf, e))?;

        if map.len() < RECORD_SIZE {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is too short to be a DAF file ({} bytes)",
                path_buf.display(),
                map.len()
            )));
        }

        let header = &map[..RECORD_SIZE];
        let locidw = String::from_utf8_lossy(&header[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") && locidw != "NAIF/DAF" {
            return Err(JplephemError::InvalidFormat(format!(
                "Unrecognized DAF ID word {:?}",
                locidw
            )));
        }

        let endian = detect_endian(header)?;
        let read_u32 = |range: std::ops::Range<usize>| match endian {
            Endian::Little => LittleEndian::read_u32(&header[range]),
            Endian::Big => BigEndian::read_u32(&header[range]),
        };

        let nd = read_u32(8..12);
        let ni = read_u32(12..16);
        let ifname = String::from_utf8_lossy(&header[16..76]).trim_end().to_string();
        let fward = read_u32(76..80);
        let bward = read_u32(80..84);
        let free = read_u32(84..88);

        let daf = DAF {
            path: path_buf,
            locidw,
            nd,
            ni,
            ifname,
            fward,
            bward,
            free,
            endian,
            map,
        };

        debug!(
            "DAF header: locidw={}, nd={}, ni={}, fward={}, bward={}, free={}, ifname={}, endian={:?}",
            daf.locidw, daf.nd, daf.ni, daf.fward, daf.bward, daf.free, daf.ifname, daf.endian
        );

        if !daf.is_valid() {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid DAF header: nd={}, ni={}, fward={}, bward={}, free={}",
                daf.nd, daf.ni, daf.fward, daf.bward, daf.free
            )));
        }

        Ok(daf)
    }

    /// Check if the DAF header is valid
    fn is_valid(&self) -> bool {
        self.nd > 0 && self.ni > 0 && self.fward > 0 && self.bward >= self.fward && self.free > 0
    }

    /// Number of whole records in the file
    pub fn record_count(&self) -> usize {
        self.map.len() / RECORD_SIZE
    }

    /// Summary size in double-precision words
    fn summary_length(&self) -> usize {
        self.nd as usize + (self.ni as usize + 1) / 2
    }

    fn read_f64(&self, bytes: &[u8]) -> f64 {
        match self.endian {
            Endian::Little => LittleEndian::read_f64(bytes),
            Endian::Big => BigEndian::read_f64(bytes),
        }
    }

    fn read_i32(&self, bytes: &[u8]) -> i32 {
        match self.endian {
            Endian::Little => LittleEndian::read_i32(bytes),
            Endian::Big => BigEndian::read_i32(bytes),
        }
    }

    /// Read a record (1024 bytes) at the given record number (1-indexed)
    pub fn read_record(&self, record_number: usize) -> Result<&[u8]> {
        if record_number < 1 || record_number > self.record_count() {
            return Err(JplephemError::InvalidFormat(format!(
                "Record {} is outside the file ({} records)",
                record_number,
                self.record_count()
            )));
        }
        let offset = (record_number - 1) * RECORD_SIZE;
        Ok(&self.map[offset..offset + RECORD_SIZE])
    }

    /// Read comments from the comment area of the file
    pub fn comments(&self) -> Result<String> {
        let mut raw = Vec::new();
        for record_number in 2..self.fward as usize {
            let record = self.read_record(record_number)?;
            let text = &record[..COMMENT_RECORD_CHARS];
            match text.iter().position(|&b| b == EOT) {
                Some(end) => {
                    raw.extend_from_slice(&text[..end]);
                    break;
                }
                None => raw.extend_from_slice(text),
            }
        }

        // Comment lines are separated by nulls
        let text: String = String::from_utf8_lossy(&raw)
            .chars()
            .map(|c| if c == '\0' { '\n' } else { c })
            .collect();
        Ok(text.trim_end().to_string())
    }

    /// Read every summary in the file, following the summary record chain
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();

        let nd = self.nd as usize;
        let ni = self.ni as usize;
        let step = self.summary_length() * DOUBLE_SIZE;
        let max_per_record = (RECORD_SIZE - 3 * DOUBLE_SIZE) / step;

        let mut record_number = self.fward as usize;
        while record_number > 0 {
            if !visited.insert(record_number) || visited.len() > MAX_SUMMARY_RECORDS {
                return Err(JplephemError::InvalidFormat(format!(
                    "Summary record chain loops back to record {}",
                    record_number
                )));
            }

            let summary_data = self.read_record(record_number)?;
            let name_data = self.read_record(record_number + 1)?;

            let next = self.read_f64(&summary_data[0..8]) as usize;
            let n_summaries = self.read_f64(&summary_data[16..24]) as usize;
            if n_summaries > max_per_record {
                return Err(JplephemError::InvalidFormat(format!(
                    "Summary record {} claims {} summaries, at most {} fit",
                    record_number, n_summaries, max_per_record
                )));
            }

            for i in 0..n_summaries {
                let start = 3 * DOUBLE_SIZE + i * step;

                let doubles = (0..nd)
                    .map(|j| {
                        let pos = start + j * DOUBLE_SIZE;
                        self.read_f64(&summary_data[pos..pos + DOUBLE_SIZE])
                    })
                    .collect();

                // Integers are packed two per double word after the doubles
                let int_start = start + nd * DOUBLE_SIZE;
                let integers = (0..ni)
                    .map(|j| {
                        let pos = int_start + j * 4;
                        self.read_i32(&summary_data[pos..pos + 4])
                    })
                    .collect();

                let name_bytes = &name_data[i * step..(i + 1) * step];
                let name = String::from_utf8_lossy(name_bytes)
                    .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string();

                result.push(Summary {
                    name,
                    doubles,
                    integers,
                });
            }

            record_number = next;
        }

        debug!("Read {} summaries from {}", result.len(), self.path.display());
        Ok(result)
    }

    /// Read words `start..=end` (1-based double-precision addresses)
    pub fn read_array(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start < 1 || end < start {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid array bounds: start={}, end={}",
                start, end
            )));
        }

        let first = (start - 1) * DOUBLE_SIZE;
        let last = end * DOUBLE_SIZE;
        if last > self.map.len() {
            return Err(JplephemError::InvalidFormat(format!(
                "Array {}..={} runs past the end of {}",
                start,
                end,
                self.path.display()
            )));
        }

        Ok(self.map[first..last]
            .chunks_exact(DOUBLE_SIZE)
            .map(|chunk| self.read_f64(chunk))
            .collect())
    }
}

/// Work out the byte order from the LOCFMT field, falling back to checking
/// which interpretation of ND gives a plausible value for older files
fn detect_endian(header: &[u8]) -> Result<Endian> {
    match &header[88..96] {
        b"LTL-IEEE" => return Ok(Endian::Little),
        b"BIG-IEEE" => return Ok(Endian::Big),
        _ => {}
    }

    let nd_little = LittleEndian::read_u32(&header[8..12]);
    let nd_big = BigEndian::read_u32(&header[8..12]);
    if nd_little > 0 && nd_little < 125 {
        Ok(Endian::Little)
    } else if nd_big > 0 && nd_big < 125 {
        Ok(Endian::Big)
    } else {
        Err(JplephemError::InvalidFormat(
            "Could not determine DAF byte order".to_string(),
        ))
    }
}

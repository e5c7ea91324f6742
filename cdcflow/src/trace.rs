//! Waveform traces.
//!
//! A [`Trace`] records probed [`Signal`] values, one sample per probe, and renders them either as
//! wave strings (`0`/`1` where a bit changes, `.` where it holds, `=` where a vector changes) or as
//! a Value Change Dump file readable by any waveform viewer.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("file system error: {error:?}")]
    Fs { error: io::Error },
}

/// Identifier code of the `index`-th VCD variable.
fn vcd_code(mut index: usize) -> String {
    let mut code = String::new();
    loop {
        code.push(char::from(b'!' + (index % 94) as u8));
        index /= 94;
        if index == 0 {
            return code;
        }
    }
}

#[derive(Debug, Clone)]
struct Var {
    code: String,
    width: usize,
    samples: Vec<(u64, Vec<bool>)>,
}

impl Var {
    /// Value changes, keeping the last sample taken at any one time.
    fn changes(&self) -> Vec<(u64, &[bool])> {
        let mut changes: Vec<(u64, &[bool])> = Vec::with_capacity(self.samples.len());
        for (time, bits) in &self.samples {
            match changes.last_mut() {
                Some(last) if last.0 == *time => last.1 = bits.as_slice(),
                _ => changes.push((*time, bits.as_slice())),
            }
        }
        changes.dedup_by(|later, earlier| later.1 == earlier.1);
        changes
    }

    fn vcd_value(&self, bits: &[bool]) -> String {
        if self.width == 1 {
            format!("{}{}", u8::from(bits[0]), self.code)
        } else {
            format!("b{} {}", bits.iter().rev().map(|bit| u8::from(*bit)).join(""), self.code)
        }
    }
}

/// Recorded waveforms of one simulation.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Scope name of the dump.
    name: String,
    /// Variables in probe order.
    vars: LinkedHashMap<String, Var>,
}

impl Trace {
    /// Creates an empty trace.
    pub fn new(name: &str) -> Self { Self { name: name.to_string(), vars: LinkedHashMap::new() } }

    /// Records `value` at `time`.
    ///
    /// Every member of `value` becomes a variable named `{scope}_{member}` (or `scope` itself for
    /// a plain vector).
    pub fn probe<V: Signal>(&mut self, time: u64, scope: &str, value: V) {
        let bits = value.transl();
        let scope = (!scope.is_empty()).then(|| scope.to_string());
        let mut offset = 0;

        for (member, width) in V::port_decls().iter() {
            let name = crate::some_or!(join_options("_", [scope.clone(), member]), "value".to_string());
            let var = self.var_mut(name, width);
            var.samples.push((time, bits[offset..offset + width].to_vec()));
            offset += width;
        }
    }

    fn var_mut(&mut self, name: String, width: usize) -> &mut Var {
        let code = vcd_code(self.vars.len());
        let var = self.vars.entry(name.clone()).or_insert_with(|| Var { code, width, samples: vec![] });
        assert_eq!(var.width, width, "`{}` was probed with a different width", name);
        var
    }

    /// Names of the recorded variables in probe order.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.vars.keys().map(String::as_str) }

    /// Sampled values of variable `name` as integers.
    pub fn samples(&self, name: &str) -> Option<Vec<u128>> {
        let var = self.vars.get(name)?;
        Some(var.samples.iter().map(|(_, bits)| bitvec_to_u128(bits)).collect())
    }

    /// Wave string of variable `name`, one character per sample.
    pub fn wave(&self, name: &str) -> Option<String> {
        let var = self.vars.get(name)?;
        let mut last: Option<&Vec<bool>> = None;
        let wave = var
            .samples
            .iter()
            .map(|(_, bits)| {
                let c = if last == Some(bits) {
                    '.'
                } else if var.width == 1 {
                    if bits[0] {
                        '1'
                    } else {
                        '0'
                    }
                } else {
                    '='
                };
                last = Some(bits);
                c
            })
            .collect();
        Some(wave)
    }

    /// Writes the trace in Value Change Dump format.
    pub fn write_vcd<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "$timescale 1ps $end")?;
        writeln!(w, "$scope module {} $end", self.name)?;
        for (name, var) in &self.vars {
            writeln!(w, "$var wire {} {} {} $end", var.width, var.code, name)?;
        }
        writeln!(w, "$upscope $end")?;
        writeln!(w, "$enddefinitions $end")?;

        // Ties on time are broken by probe order so that the dump is deterministic.
        let changes = self
            .vars
            .values()
            .enumerate()
            .map(|(index, var)| var.changes().into_iter().map(move |(time, bits)| (time, index, var, bits)))
            .kmerge_by(|l, r| (l.0, l.1) < (r.0, r.1));
        for (time, group) in &changes.group_by(|(time, _, _, _)| *time) {
            writeln!(w, "#{}", time)?;
            for (_, _, var, bits) in group {
                writeln!(w, "{}", var.vcd_value(bits))?;
            }
        }

        Ok(())
    }

    /// Writes the trace into the file at `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), TraceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| TraceError::Fs { error })?;
        }
        let file = File::create(path).map_err(|error| TraceError::Fs { error })?;
        let mut w = BufWriter::new(file);
        self.write_vcd(&mut w).and_then(|_| w.flush()).map_err(|error| TraceError::Fs { error })?;
        log::debug!("{}: wrote {} variables to {}", self.name, self.vars.len(), path.display());
        Ok(())
    }
}

use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use orbisdbg_wire::{MemoryMapEntry, ProcessEntry, ProcessInfo};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ProcessListOutput<'a> {
    schema_id: &'a str,
    count: usize,
    processes: Vec<ProcessOutput>,
}

#[derive(Serialize)]
struct ProcessOutput {
    pid: i32,
    name: String,
}

pub fn print_process_list(entries: &[ProcessEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ProcessListOutput {
                schema_id: "https://schemas.orbisdbg.dev/cli/v1/process-list.schema.json",
                count: entries.len(),
                processes: entries
                    .iter()
                    .map(|e| ProcessOutput {
                        pid: e.pid,
                        name: e.name.clone(),
                    })
                    .collect(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PID", "NAME"]);
            for entry in entries {
                table.add_row(vec![entry.pid.to_string(), entry.name.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                println!("pid={} name={}", entry.pid, entry.name);
            }
        }
        OutputFormat::Raw => {
            for entry in entries {
                println!("{}\t{}", entry.pid, entry.name);
            }
        }
    }
}

#[derive(Serialize)]
struct MemoryMapOutput<'a> {
    schema_id: &'a str,
    pid: i32,
    count: usize,
    maps: Vec<MapEntryOutput>,
}

#[derive(Serialize)]
struct MapEntryOutput {
    name: String,
    start: String,
    end: String,
    size: u64,
    prot: String,
    offset: String,
}

fn map_entry_output(entry: &MemoryMapEntry) -> MapEntryOutput {
    MapEntryOutput {
        name: entry.name.clone(),
        start: format!("{:#x}", entry.start),
        end: format!("{:#x}", entry.end),
        size: entry.len(),
        prot: entry.prot_string(),
        offset: format!("{:#x}", entry.offset),
    }
}

pub fn print_memory_maps(pid: i32, entries: &[MemoryMapEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MemoryMapOutput {
                schema_id: "https://schemas.orbisdbg.dev/cli/v1/process-maps.schema.json",
                pid,
                count: entries.len(),
                maps: entries.iter().map(map_entry_output).collect(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["START", "END", "PROT", "OFFSET", "NAME"]);
            for entry in entries {
                table.add_row(vec![
                    format!("{:#014x}", entry.start),
                    format!("{:#014x}", entry.end),
                    entry.prot_string(),
                    format!("{:#x}", entry.offset),
                    entry.name.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                println!(
                    "{:#014x}-{:#014x} {} {:#010x} {}",
                    entry.start,
                    entry.end,
                    entry.prot_string(),
                    entry.offset,
                    entry.name
                );
            }
        }
        OutputFormat::Raw => {
            for entry in entries {
                println!(
                    "{:x}\t{:x}\t{}\t{:x}\t{}",
                    entry.start,
                    entry.end,
                    entry.prot_string(),
                    entry.offset,
                    entry.name
                );
            }
        }
    }
}

#[derive(Serialize)]
struct ProcessInfoOutput<'a> {
    schema_id: &'a str,
    pid: i32,
    name: &'a str,
}

pub fn print_process_info(info: &ProcessInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ProcessInfoOutput {
                schema_id: "https://schemas.orbisdbg.dev/cli/v1/process-info.schema.json",
                pid: info.pid,
                name: &info.name,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PID", "NAME"]);
            table.add_row(vec![info.pid.to_string(), info.name.clone()]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!("pid={} name={}", info.pid, info.name);
        }
    }
}

#[derive(Serialize)]
struct AddressOutput<'a> {
    schema_id: &'a str,
    pid: i32,
    address: String,
}

pub fn print_load_address(pid: i32, addr: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = AddressOutput {
                schema_id: "https://schemas.orbisdbg.dev/cli/v1/elf-load.schema.json",
                pid,
                address: format!("{addr:#x}"),
            };
            print_json(&out);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("loaded at {addr:#x} (pid {pid})");
        }
        OutputFormat::Raw => {
            println!("{addr:x}");
        }
    }
}

/// Dump memory the way debuggers do: offset, 16 hex bytes, ASCII gutter.
pub fn print_hexdump(base: u64, data: &[u8]) {
    for (row, chunk) in data.chunks(16).enumerate() {
        let addr = base + (row as u64) * 16;
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if (0x20..0x7F).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("{addr:#014x}  {:<47}  |{ascii}|", hex.join(" "));
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_entry_output_formats_addresses() {
        let entry = MemoryMapEntry {
            name: "heap".to_string(),
            start: 0x4000_0000,
            end: 0x4001_0000,
            offset: 0,
            prot: 0x3,
        };
        let out = map_entry_output(&entry);
        assert_eq!(out.start, "0x40000000");
        assert_eq!(out.end, "0x40010000");
        assert_eq!(out.size, 0x1_0000);
        assert_eq!(out.prot, "rw-");
    }
}

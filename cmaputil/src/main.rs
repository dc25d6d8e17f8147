use cmapdb::registry::get_cmap;
use cmapdb::{AnyCMap, CMap, CMapRegistry, DirectoryRegistry, MemoryRegistry, UnicodeMap};

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, author, about = "CMap utility program using cmapdb library")]
struct Cli {
	/// Directory holding CMap resources for `usecmap` and named lookups
	#[arg(short, long, global = true)]
	dir: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Decode hex encoded bytes to CIDs
	Decode {
		/// CMap file, or a name resolvable in --dir such as Identity-H
		cmap: String,
		/// Code bytes, e.g. "8140 41"
		hex: String,
	},
	/// Print the Unicode text of CIDs
	Unicode {
		/// ToUnicode CMap file
		file: PathBuf,
		cids: Vec<u32>,
	},
	/// Show attributes and mapping counts of a CMap file
	Info { file: PathBuf },
}

fn parse_hex(hex: &str) -> Result<Vec<u8>, Box<dyn Error>> {
	let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
	if digits.len() % 2 != 0 {
		return Err(format!("odd number of hex digits in {:?}", hex).into());
	}
	digits
		.chunks(2)
		.map(|pair| Ok(u8::from_str_radix(std::str::from_utf8(pair)?, 16)?))
		.collect()
}

fn open_cmap(name: &str, registry: &dyn CMapRegistry) -> Result<AnyCMap, Box<dyn Error>> {
	let path = PathBuf::from(name);
	if path.is_file() {
		info!("Open {}", path.display());
		return Ok(CMap::load(&path, registry)?.into());
	}
	Ok(get_cmap(registry, name)?)
}

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();
	let cli = Cli::parse();

	let registry: Box<dyn CMapRegistry> = match &cli.dir {
		Some(dir) => Box::new(DirectoryRegistry::new(dir)),
		None => Box::new(MemoryRegistry::new()),
	};

	match cli.command {
		Command::Decode { cmap, hex } => {
			let cmap = open_cmap(&cmap, registry.as_ref())?;
			let code = parse_hex(&hex)?;
			let cids: Vec<String> = cmap.decode(&code).map(|cid| cid.to_string()).collect();
			println!("{}", cids.join(" "));
		}
		Command::Unicode { file, cids } => {
			let map = UnicodeMap::load(&file, registry.as_ref())?;
			for &cid in &cids {
				match map.get(cid) {
					Some(value) => println!("{}\t{}", cid, value),
					None => println!("{}\t(unmapped)", cid),
				}
			}
			println!("{}", map.to_text(cids));
		}
		Command::Info { file } => {
			let content = std::fs::read(&file)?;
			let cmap = CMap::parse(&content, registry.as_ref())?;
			let unicode = UnicodeMap::parse(&content, registry.as_ref())?;
			for (key, value) in cmap.attrs() {
				println!("/{} {:?}", key, value);
			}
			println!("vertical: {}", cmap.is_vertical());
			println!("code mappings: {}", cmap.len());
			println!("unicode mappings: {}", unicode.len());
		}
	}
	Ok(())
}

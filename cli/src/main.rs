use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use fs_err::File;

mod logger;

use self::logger::Logger;

use wlav::AsmLayout;
use wlav::Assembler;
use wlav::ObjectWriter;
use wlav::SectionKind;
use wlav::Streamer;
use wlav::SymbolAttribute;
use wlav::TargetInfo;

#[derive(clap::Parser)]
#[clap(version)]
struct Args {
    /// Verbose output.
    #[clap(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Assemble a small demo unit and write it out as a WLAV object file.
    Build(BuildArgs),
    /// Print the CPU's predefined macros and data layout.
    Target(TargetArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Target CPU.
    #[clap(long = "cpu", value_name = "CPU", default_value = "65816")]
    cpu: String,

    /// Output object file.
    #[clap(value_name = "FILE")]
    output: PathBuf,
}

#[derive(clap::Args)]
struct TargetArgs {
    /// Target CPU.
    #[clap(value_name = "CPU")]
    cpu: String,
}

fn main() -> ExitCode {
    match do_main() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn do_main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    Logger::init(args.verbose)?;
    match args.command {
        Command::Build(build_args) => build(build_args),
        Command::Target(target_args) => target(target_args),
    }
}

/// Assemble a minimal unit — one exported label in `.text`, one exported common symbol in
/// `.bss` — and serialize it as a WLAV object.
fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut target_info = TargetInfo::new();
    if !target_info.set_cpu(&args.cpu) {
        return Err(format!("unknown CPU {:?}", args.cpu).into());
    }
    log::debug!("data layout: {}", target_info.data_layout());

    let mut asm = Assembler::new();
    asm.add_file_name(args.output.to_string_lossy().into_owned());

    let main = asm.intern_symbol("main", false);
    let counter = asm.intern_symbol("counter", false);
    {
        let mut streamer = Streamer::new(&mut asm);
        streamer.switch_section(".text", SectionKind::Text);
        streamer.emit_label(main);
        streamer.emit_symbol_attribute(main, SymbolAttribute::Global);

        streamer.switch_section(".bss", SectionKind::Bss);
        streamer.emit_common_symbol(counter, 2, 2);
        streamer.emit_symbol_attribute(counter, SymbolAttribute::Global);
    }

    let layout = AsmLayout::new(&asm);
    let mut writer = ObjectWriter::new();
    writer.enumerate_sections(&asm);
    writer.execute_post_layout_binding(&asm);

    let out = File::create(&args.output)?;
    let bytes = writer.write_object(&asm, &layout, out)?;
    println!(
        "{} {} bytes to {}",
        "wrote".bold().green(),
        bytes,
        args.output.display()
    );
    Ok(())
}

fn target(args: TargetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut info = TargetInfo::new();
    if !info.set_cpu(&args.cpu) {
        return Err(format!("unknown CPU {:?}", args.cpu).into());
    }
    println!("{}: {}", "CPU".bold().blue(), args.cpu);
    println!("{}: {}", "pointer width".bold().blue(), info.pointer_width(0));
    println!("{}: {}", "data layout".bold().blue(), info.data_layout());
    println!("{}:", "macros".bold().blue());
    for name in info.predefined_macros() {
        println!("  #define {name} 1");
    }
    Ok(())
}

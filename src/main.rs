// reset; cargo run -- upload ./data/exames.xlsx
// reset; cargo run -- history --exam Hemoglobina

use clap::Parser;
use history_lib::{FileStorage, Session};
use lab_history::{commands, exam_info::GeminiExamInfo, Args, Command, Settings};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let arguments = Args::parse();
    let settings = Settings::from_args(&arguments);

    if let Err(e) = run(&arguments, &settings) {
        eprintln!("❌ {e}");
        if matches!(arguments.command, Command::Upload { .. }) {
            eprintln!("❌ Check {} for details.", settings.errors_log().display());
        }
        std::process::exit(1);
    }
}

fn run(arguments: &Args, settings: &Settings) -> anyhow::Result<()> {
    let storage = FileStorage::open(&settings.data_dir)?;
    let mut session = Session::start(storage);
    let info = GeminiExamInfo::new(settings.api_key.clone(), &settings.model);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&arguments.command, &mut session, settings, &info, &mut out)
}

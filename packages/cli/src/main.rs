use clap::Parser;

use etcdfs_cli::Args;

fn main() {
    let args = Args::parse();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    etcdfs_cli::logger(&config).init();

    if let Err(e) = etcdfs_cli::run(config, &args.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

use getopts::Options;
use std::env;

use tourstore::config::Settings;
use tourstore::init_logging;
use tourstore::repository::postgres::create_pool;
use tourstore::repository::PgTourRepository;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("n", "name", "user name", "NAME");
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }

    let name = match matches.opt_str("n") {
        Some(name) => name,
        None => {
            print_usage(&program, opts);
            return Ok(());
        }
    };

    init_logging();
    let settings = Settings::from_env()?;
    let repository = PgTourRepository::new(create_pool(&settings.database_url, 1)?);
    let user = repository.create_user(&name)?;
    println!("Created user {} with ID {}", user.username, user.id);
    Ok(())
}

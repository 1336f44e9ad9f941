use getopts::Options;
use std::env;
use std::sync::Arc;

use tourstore::config::Settings;
use tourstore::gpx;
use tourstore::init_logging;
use tourstore::repository::postgres::create_pool;
use tourstore::repository::PgTourRepository;
use tourstore::TourService;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("u", "user", "creator user name", "NAME");
    opts.optopt("s", "sport", "sport name", "SPORT");
    opts.optopt("g", "gpx", "GPX file", "FILE");
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }

    let (user, sport, file) = match (matches.opt_str("u"), matches.opt_str("s"), matches.opt_str("g")) {
        (Some(user), Some(sport), Some(file)) => (user, sport, file),
        _ => {
            print_usage(&program, opts);
            return Ok(());
        }
    };

    init_logging();
    let settings = Settings::from_env()?;
    let repository = PgTourRepository::new(create_pool(&settings.database_url, 1)?);
    let service = TourService::new(Arc::new(repository), settings.altitude_mode);

    let gpx_data = gpx::read_whole_file(&file)?;
    let tour = gpx::to_representation(&user, &sport, &gpx_data)?;
    let id = service.create_tour(&tour)?;
    println!("Created tour with ID {} ({} points)", id, tour.geometry.len());
    Ok(())
}

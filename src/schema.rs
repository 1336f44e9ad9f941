use postgres::Client;

/// WGS84
pub const SRID: i32 = 4326;

pub const USER_FK: &str = "tours_user_fk";
pub const SPORT_FK: &str = "tours_sport_fk";

const CREATE: &str = "
    CREATE EXTENSION IF NOT EXISTS postgis;

    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS users_username_idx ON users (lower(username));

    CREATE TABLE IF NOT EXISTS sports (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS sports_name_idx ON sports (lower(name));

    CREATE TABLE IF NOT EXISTS tours (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL,
        sport_id INTEGER NOT NULL,
        start_point_id INTEGER,
        CONSTRAINT tours_user_fk FOREIGN KEY (user_id) REFERENCES users (id),
        CONSTRAINT tours_sport_fk FOREIGN KEY (sport_id) REFERENCES sports (id)
    );
    CREATE INDEX IF NOT EXISTS tours_user_idx ON tours (user_id);
    CREATE INDEX IF NOT EXISTS tours_sport_idx ON tours (sport_id);

    CREATE TABLE IF NOT EXISTS points (
        id SERIAL PRIMARY KEY,
        tour_id INTEGER NOT NULL REFERENCES tours (id) ON DELETE CASCADE,
        ts TIMESTAMPTZ NOT NULL,
        geom geometry(PointZ, 4326) NOT NULL
    );
    CREATE INDEX IF NOT EXISTS points_tour_idx ON points (tour_id, ts);
    CREATE INDEX IF NOT EXISTS points_geom_idx ON points USING GIST (geom);
";

const DROP: &str = "
    DROP TABLE IF EXISTS points;
    DROP TABLE IF EXISTS tours;
    DROP TABLE IF EXISTS sports;
    DROP TABLE IF EXISTS users;
";

pub fn create_db(db: &mut Client) -> Result<(), postgres::Error> {
    db.batch_execute(CREATE)
}

pub fn empty_db(db: &mut Client) -> Result<(), postgres::Error> {
    db.batch_execute(DROP)
}

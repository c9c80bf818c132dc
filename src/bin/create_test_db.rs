use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month, OffsetDateTime};

use finance_tracker::{
    PasswordHash, Transaction, TransactionType, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

const DEMO_NAME: &str = "Demo";
const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "averystrongandsecurepassword";
const MONTHS_OF_DATA: u8 = 6;

/// A utility for creating a test database for the finance tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {DEMO_EMAIL} with password {DEMO_PASSWORD}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new(DEMO_PASSWORD, &[DEMO_NAME, DEMO_EMAIL])?,
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(DEMO_NAME, DEMO_EMAIL.parse()?, password_hash, &conn)?;

    println!("Creating transactions for the last {MONTHS_OF_DATA} months...");

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for months_ago in (0..MONTHS_OF_DATA).rev() {
        let month_start = first_of_month(today, months_ago)?;
        // Vary the spending from month to month so the trend has something to show.
        let variation = f64::from(months_ago) * 35.0;

        let month = [
            Transaction::build(TransactionType::Income, 4200.0, "salary")
                .description("Monthly pay"),
            Transaction::build(TransactionType::Expense, 1650.0, "rent")
                .description("Rent"),
            Transaction::build(TransactionType::Expense, 180.0 + variation, "utilities")
                .description("Power and internet"),
            Transaction::build(TransactionType::Expense, 95.5, "food")
                .description("Groceries"),
            Transaction::build(TransactionType::Expense, 120.25 + variation, "food")
                .description("Groceries"),
            Transaction::build(TransactionType::Expense, 60.0, "transport")
                .description("Bus pass"),
            Transaction::build(TransactionType::Expense, 45.0 + variation / 2.0, "entertainment")
                .description("Movies"),
        ];

        for (day_offset, builder) in [0, 0, 3, 7, 18, 10, 21].into_iter().zip(month) {
            let date = month_start + Duration::days(day_offset);

            // Skip dates that have not happened yet this month.
            if date > today {
                continue;
            }

            create_transaction(user.id, builder.date(date), &conn)?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}

/// The first day of the month `months_ago` months before the month of `today`.
fn first_of_month(today: Date, months_ago: u8) -> Result<Date, time::error::ComponentRange> {
    let mut year = today.year();
    let mut month = today.month();

    for _ in 0..months_ago {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    Date::from_calendar_date(year, month, 1)
}

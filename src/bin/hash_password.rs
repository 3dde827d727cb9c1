use clap::Parser;
use std::io::BufRead;
use tokenward::application_impl::Argon2PasswordVerifier;

/// Prints an Argon2 PHC hash for seeding `users.password_hash` or `[[store.users]]`.
#[derive(Parser, Debug)]
#[command(name = "hash_password")]
struct Args {
    /// Password to hash; read from the first line of stdin when omitted.
    password: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let password = match args.password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        return Err(anyhow::anyhow!("password must not be empty"));
    }

    let hash = Argon2PasswordVerifier.hash_password(&password)?;
    println!("{hash}");
    Ok(())
}

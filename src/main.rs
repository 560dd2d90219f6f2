use anyhow::Context;
use clap::Parser;
use std::{env, path::PathBuf};

use gcc_admin_seed::config::{self, FirebaseOptions};
use gcc_admin_seed::credentials::{Credentials, ServiceAccountKey};
use gcc_admin_seed::error::Error;
use gcc_admin_seed::provision::{AdminProfile, Provisioner};
use gcc_admin_seed::report;
use gcc_admin_seed::Firebase;

#[derive(Parser, Debug)]
#[clap(name = "seed-admin", version)]
#[clap(about = "Creates or repairs the GCC super admin account", long_about = None)]
struct Cli {
    /// Path to the service account key file
    #[clap(long, default_value = "service-account-key.json")]
    credentials: PathBuf,

    /// Firebase project id. Defaults to the key's project, or to
    /// GOOGLE_CLOUD_PROJECT when running against the emulator suite.
    #[clap(long)]
    project: Option<String>,

    /// Admin sign-in email
    #[clap(long, default_value = "admin@gcc.com")]
    email: String,

    /// Admin sign-in password, also applied to a pre-existing account
    #[clap(long, default_value = "GCC@Admin2024")]
    password: String,

    /// Admin first name
    #[clap(long, default_value = "Super")]
    first_name: String,

    /// Admin last name
    #[clap(long, default_value = "Administrator")]
    last_name: String,

    /// Display name on the identity and the user record
    #[clap(long, default_value = "Super Administrator")]
    full_name: String,

    /// Department shown on the user record
    #[clap(long, default_value = "Administration")]
    department: String,

    /// Position shown on the user record
    #[clap(long, default_value = "Super Admin")]
    position: String,

    /// Contact phone number
    #[clap(long, default_value = "+966500000000")]
    phone: String,

    /// Login URL echoed in the final report
    #[clap(long, default_value = "http://localhost:59814")]
    login_url: String,

    /// Collection the user record is written to
    #[clap(long, default_value = "users")]
    collection: String,
}

async fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok(); // Load .env file if present
    let cli = Cli::parse();

    // The emulator suite is all-or-nothing: seeding one real backend and
    // one emulated backend would leave half an account behind.
    let firebase = match config::emulator_hosts() {
        Some(hosts) => {
            let project = cli
                .project
                .clone()
                .or_else(|| env::var("GOOGLE_CLOUD_PROJECT").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Project id not provided via --project or GOOGLE_CLOUD_PROJECT \
                         (the emulator suite cannot supply one)"
                    )
                })?;
            println!(
                "Using the emulator suite (auth at {}, firestore at {})",
                hosts.auth_host, hosts.firestore_host
            );
            let options = FirebaseOptions::default()
                .with_auth_endpoint(&format!("http://{}", hosts.auth_host))
                .with_firestore_endpoint(&format!("http://{}", hosts.firestore_host));
            Firebase::new_with_options(&project, Credentials::Emulator, options)?
        }
        None => {
            let key = ServiceAccountKey::from_file(&cli.credentials)
                .with_context(|| format!("Could not load credentials from {:?}", cli.credentials))?;
            let project = cli.project.clone().unwrap_or_else(|| key.project_id.clone());
            println!(
                "Using service account {} for project {}",
                key.client_email, project
            );
            Firebase::new(&project, Credentials::ServiceAccount(key))?
        }
    };

    let profile = AdminProfile {
        email: cli.email.clone(),
        password: cli.password.clone(),
        first_name: cli.first_name.clone(),
        last_name: cli.last_name.clone(),
        full_name: cli.full_name.clone(),
        department: cli.department.clone(),
        position: cli.position.clone(),
        phone_number: cli.phone.clone(),
    };

    println!(
        "Provisioning super admin {} into collection {}...",
        profile.email, cli.collection
    );
    let provisioner = Provisioner::new(firebase.identity(), firebase.firestore())
        .with_collection(&cli.collection);
    let report = provisioner.provision(&profile).await?;

    println!("{}", report::render(&report, &profile, &cli.login_url));
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {:#}", err);
        if let Some(kind) = err.downcast_ref::<Error>().and_then(Error::kind) {
            eprintln!("Error kind: {}", kind);
        }
        std::process::exit(1);
    }
}

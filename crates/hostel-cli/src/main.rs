//! Role-based hostel dashboards as a command-line tool.
//!
//! The session persists across invocations; student and admin screens
//! map to subcommands that guard on the stored role before calling out.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use hostel_client::{
    ApiClient, PendingForm, RenewalWorkflow, Session, SessionStore, StatusFilter, SubmitPolicy,
};
use hostel_types::api::{
    CreateComplaintRequest, CreatePaymentRequest, CreateRoomRequest, LoginRequest,
    RegisterRequest, UpsertMessMenuRequest,
};
use hostel_types::models::{
    ComplaintCategory, ComplaintStatus, DocumentSlot, MealType, PaymentType, RenewalStatus, Role,
    RoomType,
};

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "hostel", about = "Hostel management dashboard", version)]
struct Cli {
    /// Backend base URL (overrides HOSTEL_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "student")]
        role: Role,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Drop the persisted session.
    Logout,
    /// Show the signed-in identity.
    Whoami,
    /// Show the room assigned to the signed-in student.
    Room,
    /// Weekly mess menu.
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },
    /// Complaints: list, submit, resolve.
    Complaints {
        #[command(subcommand)]
        action: ComplaintAction,
    },
    /// Fee payments.
    Payments {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// Room administration.
    Rooms {
        #[command(subcommand)]
        action: RoomAction,
    },
    /// Student administration.
    Students {
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Room renewal applications.
    Renewal {
        #[command(subcommand)]
        action: RenewalAction,
    },
}

#[derive(Subcommand)]
enum MenuAction {
    /// Print the menu grouped by day and meal.
    Show,
    /// Create or replace the menu for a (day, meal) pair. Admin only.
    Set {
        #[arg(long)]
        day: String,
        #[arg(long)]
        meal: MealType,
        /// Comma-separated items.
        #[arg(long)]
        items: String,
    },
    /// Remove a menu entry. Admin only.
    Delete { menu_id: Uuid },
}

#[derive(Subcommand)]
enum ComplaintAction {
    List,
    /// File a complaint for the signed-in student's room.
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "maintenance")]
        category: ComplaintCategory,
    },
    /// Update a complaint's status. Admin only.
    SetStatus {
        complaint_id: Uuid,
        status: ComplaintStatus,
    },
}

#[derive(Subcommand)]
enum PaymentAction {
    List,
    /// Create a payment record for a student. Admin only.
    Create {
        #[arg(long)]
        student_id: Uuid,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: String,
        #[arg(long, value_name = "TYPE", default_value = "hostel_fee")]
        payment_type: PaymentType,
        #[arg(long)]
        due_date: String,
    },
    /// Mark a payment as paid. Admin only.
    MarkPaid { payment_id: Uuid },
}

#[derive(Subcommand)]
enum RoomAction {
    List,
    /// Add a room. Admin only.
    Create {
        #[arg(long)]
        room_number: String,
        #[arg(long)]
        capacity: u32,
        #[arg(long, value_name = "TYPE", default_value = "double")]
        room_type: RoomType,
        #[arg(long)]
        floor: String,
    },
    /// Assign a student to a room. Admin only.
    Assign {
        room_number: String,
        student_id: Uuid,
    },
}

#[derive(Subcommand)]
enum StudentAction {
    /// List registered students. Admin only.
    List,
    /// Remove a student (and free their room). Admin only.
    Remove { student_id: Uuid },
}

#[derive(Subcommand)]
enum RenewalAction {
    /// Show the pending application and slot checklist.
    Status,
    /// Upload a document into a slot on the pending application
    /// (aadhar, result, caste_cert, photo).
    Upload { slot: DocumentSlot, path: PathBuf },
    /// Submit a renewal application, uploading the given documents.
    Submit {
        /// Document to upload and attach, as SLOT=PATH
        /// (e.g. --doc aadhar=scan.pdf). Repeatable.
        #[arg(long = "doc", value_name = "SLOT=PATH", value_parser = parse_doc_spec)]
        docs: Vec<(DocumentSlot, PathBuf)>,
        /// Require every mandatory slot instead of at least one document.
        #[arg(long)]
        strict: bool,
    },
    /// List applications, optionally filtered. Admin only.
    List {
        /// all, submitted, or under_review.
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Apply a review transition. Admin only.
    Review {
        form_id: Uuid,
        status: RenewalStatus,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Download a stored document. Admins may fetch any student's file.
    Download {
        student_id: Uuid,
        filename: String,
        dest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel=info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let base_url = cli
        .api_url
        .or_else(|| std::env::var("HOSTEL_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let store = SessionStore::from_env();

    match cli.command {
        Command::Login { email, password } => {
            let client = ApiClient::new(&base_url, None)?;
            let auth = client.login(&LoginRequest { email, password }).await?;
            store.save(&Session {
                token: auth.token,
                user: auth.user.clone(),
            })?;
            println!("signed in as {} ({})", auth.user.name, auth.user.role);
        }
        Command::Register {
            email,
            password,
            name,
            role,
            phone,
        } => {
            let client = ApiClient::new(&base_url, None)?;
            let auth = client
                .register(&RegisterRequest {
                    email,
                    password,
                    name,
                    role,
                    phone,
                })
                .await?;
            store.save(&Session {
                token: auth.token,
                user: auth.user.clone(),
            })?;
            println!("registered {} ({})", auth.user.name, auth.user.role);
        }
        Command::Logout => {
            store.clear()?;
            println!("signed out");
        }
        Command::Whoami => {
            let session = require_session(&store)?;
            let user = &session.user;
            println!("{} <{}> - {}", user.name, user.email, user.role);
            if let Some(room) = &user.room_number {
                println!("room {room}");
            }
        }
        Command::Room => {
            let (client, session) = signed_in(&store, &base_url)?;
            require_role(&session, Role::Student)?;
            let response = client.my_room().await?;
            match response.room {
                Some(details) => render::room_details(&details),
                None => println!("no room assigned yet"),
            }
        }
        Command::Menu { action } => run_menu(action, &store, &base_url).await?,
        Command::Complaints { action } => run_complaints(action, &store, &base_url).await?,
        Command::Payments { action } => run_payments(action, &store, &base_url).await?,
        Command::Rooms { action } => run_rooms(action, &store, &base_url).await?,
        Command::Students { action } => run_students(action, &store, &base_url).await?,
        Command::Renewal { action } => run_renewal(action, &store, &base_url).await?,
    }

    Ok(())
}

fn require_session(store: &SessionStore) -> Result<Session> {
    store
        .load()?
        .context("not signed in; run `hostel login` first")
}

fn signed_in(store: &SessionStore, base_url: &str) -> Result<(ApiClient, Session)> {
    let session = require_session(store)?;
    let client = ApiClient::with_session(base_url, &session)?;
    Ok((client, session))
}

fn parse_doc_spec(s: &str) -> std::result::Result<(DocumentSlot, PathBuf), String> {
    let (slot, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=PATH, got '{s}'"))?;
    let slot: DocumentSlot = slot.parse()?;
    if path.is_empty() {
        return Err(format!("missing path in '{s}'"));
    }
    Ok((slot, PathBuf::from(path)))
}

/// Two or more pending applications is a data-integrity violation that
/// no subcommand may work past.
fn reject_conflict(pending: &PendingForm) -> Result<()> {
    if let PendingForm::Conflict { count } = pending {
        bail!("{count} pending applications on record; contact the hostel office");
    }
    Ok(())
}

fn require_role(session: &Session, role: Role) -> Result<()> {
    if session.user.role != role {
        bail!(
            "this command needs a {role} session (signed in as {})",
            session.user.role
        );
    }
    Ok(())
}

async fn run_menu(action: MenuAction, store: &SessionStore, base_url: &str) -> Result<()> {
    let (client, session) = signed_in(store, base_url)?;
    match action {
        MenuAction::Show => {
            let menu = client.mess_menu().await?;
            render::mess_menu(&menu);
        }
        MenuAction::Set { day, meal, items } => {
            require_role(&session, Role::Admin)?;
            let items: Vec<String> = items
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            if items.is_empty() {
                bail!("menu items must not be empty");
            }
            let response = client
                .upsert_mess_menu(&UpsertMessMenuRequest {
                    day,
                    meal_type: meal,
                    items,
                })
                .await?;
            println!("{}", response.message);
        }
        MenuAction::Delete { menu_id } => {
            require_role(&session, Role::Admin)?;
            let response = client.delete_mess_menu(menu_id).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

async fn run_complaints(
    action: ComplaintAction,
    store: &SessionStore,
    base_url: &str,
) -> Result<()> {
    let (client, session) = signed_in(store, base_url)?;
    match action {
        ComplaintAction::List => {
            let complaints = client.complaints().await?;
            render::complaints(&complaints);
        }
        ComplaintAction::Submit {
            title,
            description,
            category,
        } => {
            require_role(&session, Role::Student)?;
            let response = client
                .create_complaint(&CreateComplaintRequest {
                    title,
                    description,
                    category,
                })
                .await?;
            println!("{}", response.message);
        }
        ComplaintAction::SetStatus {
            complaint_id,
            status,
        } => {
            require_role(&session, Role::Admin)?;
            let response = client.set_complaint_status(complaint_id, status).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

async fn run_payments(action: PaymentAction, store: &SessionStore, base_url: &str) -> Result<()> {
    let (client, session) = signed_in(store, base_url)?;
    match action {
        PaymentAction::List => {
            let payments = client.payments().await?;
            render::payments(&payments);
        }
        PaymentAction::Create {
            student_id,
            amount,
            month,
            year,
            payment_type,
            due_date,
        } => {
            require_role(&session, Role::Admin)?;
            let response = client
                .create_payment(&CreatePaymentRequest {
                    student_id,
                    amount,
                    month,
                    year,
                    payment_type,
                    due_date,
                })
                .await?;
            println!("{}", response.message);
        }
        PaymentAction::MarkPaid { payment_id } => {
            require_role(&session, Role::Admin)?;
            let response = client.mark_payment_paid(payment_id).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

async fn run_rooms(action: RoomAction, store: &SessionStore, base_url: &str) -> Result<()> {
    let (client, session) = signed_in(store, base_url)?;
    match action {
        RoomAction::List => {
            let rooms = client.rooms().await?;
            render::rooms(&rooms);
        }
        RoomAction::Create {
            room_number,
            capacity,
            room_type,
            floor,
        } => {
            require_role(&session, Role::Admin)?;
            let response = client
                .create_room(&CreateRoomRequest {
                    room_number,
                    capacity,
                    room_type,
                    floor,
                })
                .await?;
            println!("{}", response.message);
        }
        RoomAction::Assign {
            room_number,
            student_id,
        } => {
            require_role(&session, Role::Admin)?;
            let response = client.assign_room(&room_number, student_id).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

async fn run_students(action: StudentAction, store: &SessionStore, base_url: &str) -> Result<()> {
    let (client, session) = signed_in(store, base_url)?;
    require_role(&session, Role::Admin)?;
    match action {
        StudentAction::List => {
            let students = client.students().await?;
            render::students(&students);
        }
        StudentAction::Remove { student_id } => {
            let response = client.delete_student(student_id).await?;
            println!("{}", response.message);
        }
    }
    Ok(())
}

async fn run_renewal(action: RenewalAction, store: &SessionStore, base_url: &str) -> Result<()> {
    let (client, session) = signed_in(store, base_url)?;
    match action {
        RenewalAction::Status => {
            require_role(&session, Role::Student)?;
            let mut workflow = RenewalWorkflow::new(client, SubmitPolicy::AnyDocument);
            match workflow.load().await? {
                PendingForm::None => println!("no pending application"),
                PendingForm::Active(form) => render::renewal_form(&form),
                PendingForm::Conflict { count } => {
                    bail!("{count} pending applications on record; contact the hostel office")
                }
            }
            let history = workflow.history().await?;
            let past: Vec<_> = history
                .iter()
                .filter(|form| form.status.is_terminal())
                .collect();
            if !past.is_empty() {
                println!("\nprevious applications:");
                for form in past {
                    println!(
                        "  {}  {}  {}",
                        form.created_at.format("%Y-%m-%d"),
                        form.status,
                        form.admin_comments.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        RenewalAction::Upload { slot, path } => {
            require_role(&session, Role::Student)?;
            let mut workflow = RenewalWorkflow::new(client, SubmitPolicy::AnyDocument);
            let pending = workflow.load().await?;
            reject_conflict(&pending)?;
            if matches!(pending, PendingForm::None) {
                bail!(
                    "no pending application; submit one with \
                     `hostel renewal submit --doc {slot}={}`",
                    path.display()
                );
            }
            let stored = workflow.upload_document(slot, &path).await?;
            println!("uploaded {slot}: {stored}");
        }
        RenewalAction::Submit { docs, strict } => {
            require_role(&session, Role::Student)?;
            let policy = if strict {
                SubmitPolicy::AllRequired
            } else {
                SubmitPolicy::AnyDocument
            };
            let mut workflow = RenewalWorkflow::new(client, policy);
            let pending = workflow.load().await?;
            reject_conflict(&pending)?;
            if let PendingForm::Active(form) = &pending {
                println!("updating pending application {}", form.id);
            }
            for (slot, path) in docs {
                let stored = workflow.upload_document(slot, &path).await?;
                println!("uploaded {slot}: {stored}");
            }
            let form = workflow.submit().await?;
            render::renewal_form(&form);
        }
        RenewalAction::List { filter } => {
            require_role(&session, Role::Admin)?;
            let filter = match filter.as_str() {
                "all" => StatusFilter::All,
                "submitted" => StatusFilter::Submitted,
                "under_review" => StatusFilter::UnderReview,
                other => bail!("unknown filter '{other}' (all, submitted, under_review)"),
            };
            let workflow = RenewalWorkflow::new(client, SubmitPolicy::AnyDocument);
            render::renewal_list(&workflow.list(filter).await?);
        }
        RenewalAction::Review {
            form_id,
            status,
            comments,
        } => {
            require_role(&session, Role::Admin)?;
            let form = client.renewal_form(form_id).await?;
            let workflow = RenewalWorkflow::new(client, SubmitPolicy::AnyDocument);
            let updated = workflow.review(&form, status, comments).await?;
            render::renewal_form(&updated);
        }
        RenewalAction::Download {
            student_id,
            filename,
            dest,
        } => {
            let written = client.download_file(student_id, &filename, &dest).await?;
            println!("wrote {written} bytes to {}", dest.display());
        }
    }
    Ok(())
}

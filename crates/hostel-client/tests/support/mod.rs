//! In-memory backend for loopback integration tests.
//!
//! Implements the consumed REST API with the deployed backend's
//! semantics (single pending renewal form per student, terminal forms
//! immutable, file PUT drops under-review back to submitted) so the
//! client can be exercised end to end on 127.0.0.1 without a real
//! deployment.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use hostel_types::api::{
    AuthResponse, CreateComplaintRequest, CreatePaymentRequest, CreateRenewalFormRequest,
    CreateRoomRequest, LoginRequest, MessageResponse, MyRoomResponse, RegisterRequest,
    RenewalReviewRequest, RoomDetails, Roommate, UploadFileResponse, UpsertMessMenuRequest,
};
use hostel_types::models::{
    Complaint, ComplaintStatus, DocumentSlot, Identity, MessMenu, Payment, PaymentStatus,
    RenewalForm, RenewalStatus, Role, Room, RoomStatus,
};

type Reply<T> = Result<T, (StatusCode, String)>;

struct StubUser {
    identity: Identity,
    password: String,
}

#[derive(Default)]
pub struct StubState {
    /// When set, POST /api/upload-file answers 500 before touching
    /// anything, simulating a failing transfer.
    pub fail_uploads: bool,
    /// When set, GET /api/download-file streams a few bytes and then
    /// drops the connection.
    pub fail_downloads: bool,
    users: Vec<StubUser>,
    tokens: HashMap<String, Uuid>,
    rooms: Vec<Room>,
    complaints: Vec<Complaint>,
    payments: Vec<Payment>,
    menus: Vec<MessMenu>,
    pub forms: Vec<RenewalForm>,
    files: HashMap<(Uuid, String), Vec<u8>>,
}

impl StubState {
    fn issue_token(&mut self, user_id: Uuid) -> String {
        let token = format!("tok-{}", Uuid::new_v4());
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn user_by_token(&self, token: &str) -> Option<Identity> {
        let id = self.tokens.get(token)?;
        self.users
            .iter()
            .find(|u| u.identity.id == *id)
            .map(|u| u.identity.clone())
    }

    /// Inject a form directly, bypassing the single-pending check. Lets
    /// tests construct the data-integrity violation the client must
    /// detect.
    pub fn inject_form(&mut self, student_id: Uuid, status: RenewalStatus) -> Uuid {
        let student = self
            .users
            .iter()
            .find(|u| u.identity.id == student_id)
            .expect("student must exist");
        let form = RenewalForm {
            id: Uuid::new_v4(),
            student_id,
            student_name: student.identity.name.clone(),
            room_number: student
                .identity
                .room_number
                .clone()
                .unwrap_or_else(|| "?".into()),
            status,
            files: BTreeMap::new(),
            admin_comments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };
        let id = form.id;
        self.forms.push(form);
        id
    }
}

pub type Shared = Arc<Mutex<StubState>>;

pub struct TestBackend {
    pub base_url: String,
    pub state: Shared,
}

pub async fn spawn() -> TestBackend {
    let state: Shared = Arc::new(Mutex::new(StubState::default()));
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestBackend { base_url, state }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route("/api/rooms/{room_number}/assign/{student_id}", put(assign_room))
        .route("/api/my-room", get(my_room))
        .route("/api/complaints", get(list_complaints).post(create_complaint))
        .route("/api/complaints/{id}/status", put(set_complaint_status))
        .route("/api/payments", get(list_payments).post(create_payment))
        .route("/api/payments/{id}/mark-paid", put(mark_payment_paid))
        .route("/api/mess-menu", get(list_menu).post(upsert_menu))
        .route("/api/mess-menu/{id}", delete(delete_menu))
        .route("/api/students", get(list_students))
        .route("/api/students/{id}", delete(delete_student))
        .route("/api/upload-file", post(upload_file))
        .route("/api/download-file/{student_id}/{filename}", get(download_file))
        .route("/api/renewal-forms", get(list_forms).post(create_form))
        .route("/api/renewal-forms/{id}", get(get_form).put(review_form))
        .route("/api/renewal-forms/{id}/files", put(update_form_files))
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
        .with_state(state)
}

fn authed(state: &Shared, headers: &HeaderMap) -> Reply<Identity> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or((StatusCode::UNAUTHORIZED, "missing bearer token".to_string()))?;
    state
        .lock()
        .unwrap()
        .user_by_token(token)
        .ok_or((StatusCode::UNAUTHORIZED, "invalid token".to_string()))
}

fn require_role(user: &Identity, role: Role, action: &str) -> Reply<()> {
    if user.role != role {
        return Err((StatusCode::FORBIDDEN, format!("only {role}s can {action}")));
    }
    Ok(())
}

// ── Auth ────────────────────────────────────────────────────────────────

async fn register(
    State(state): State<Shared>,
    Json(req): Json<RegisterRequest>,
) -> Reply<Json<AuthResponse>> {
    let mut guard = state.lock().unwrap();
    if guard.users.iter().any(|u| u.identity.email == req.email) {
        return Err((StatusCode::BAD_REQUEST, "Email already registered".into()));
    }

    let identity = Identity {
        id: Uuid::new_v4(),
        email: req.email,
        name: req.name,
        role: req.role,
        phone: req.phone,
        room_number: None,
    };
    guard.users.push(StubUser {
        identity: identity.clone(),
        password: req.password,
    });
    let token = guard.issue_token(identity.id);

    Ok(Json(AuthResponse {
        token,
        user: identity,
        message: Some("User registered successfully".into()),
    }))
}

async fn login(
    State(state): State<Shared>,
    Json(req): Json<LoginRequest>,
) -> Reply<Json<AuthResponse>> {
    let mut guard = state.lock().unwrap();
    let identity = guard
        .users
        .iter()
        .find(|u| u.identity.email == req.email && u.password == req.password)
        .map(|u| u.identity.clone())
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()))?;
    let token = guard.issue_token(identity.id);

    Ok(Json(AuthResponse {
        token,
        user: identity,
        message: None,
    }))
}

// ── Rooms ───────────────────────────────────────────────────────────────

async fn list_rooms(State(state): State<Shared>, headers: HeaderMap) -> Reply<Json<Vec<Room>>> {
    authed(&state, &headers)?;
    Ok(Json(state.lock().unwrap().rooms.clone()))
}

async fn create_room(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<CreateRoomRequest>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "create rooms")?;

    let mut guard = state.lock().unwrap();
    if guard.rooms.iter().any(|r| r.room_number == req.room_number) {
        return Err((StatusCode::BAD_REQUEST, "Room already exists".into()));
    }
    guard.rooms.push(Room {
        room_number: req.room_number,
        capacity: req.capacity,
        occupied: 0,
        students: Vec::new(),
        room_type: req.room_type,
        floor: req.floor,
        status: RoomStatus::Available,
    });
    Ok(Json(MessageResponse {
        message: "Room created successfully".into(),
    }))
}

async fn assign_room(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((room_number, student_id)): Path<(String, Uuid)>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "assign rooms")?;

    let mut guard = state.lock().unwrap();
    if !guard.users.iter().any(|u| u.identity.id == student_id) {
        return Err((StatusCode::NOT_FOUND, "Student not found".into()));
    }
    let room = guard
        .rooms
        .iter_mut()
        .find(|r| r.room_number == room_number)
        .ok_or((StatusCode::NOT_FOUND, "Room not found".to_string()))?;
    if room.occupied >= room.capacity {
        return Err((StatusCode::BAD_REQUEST, "Room is full".into()));
    }
    room.students.push(student_id);
    room.occupied += 1;
    room.status = if room.occupied >= room.capacity {
        RoomStatus::Full
    } else {
        RoomStatus::Available
    };

    let number = room_number.clone();
    if let Some(student) = guard.users.iter_mut().find(|u| u.identity.id == student_id) {
        student.identity.room_number = Some(number);
    }
    Ok(Json(MessageResponse {
        message: "Room assigned successfully".into(),
    }))
}

async fn my_room(State(state): State<Shared>, headers: HeaderMap) -> Reply<Json<MyRoomResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Student, "view their room")?;

    let guard = state.lock().unwrap();
    let Some(room_number) = &user.room_number else {
        return Ok(Json(MyRoomResponse {
            room: None,
            message: Some("No room assigned".into()),
        }));
    };
    let room = guard
        .rooms
        .iter()
        .find(|r| &r.room_number == room_number)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "Room not found".to_string()))?;

    let roommates = room
        .students
        .iter()
        .filter(|id| **id != user.id)
        .filter_map(|id| guard.users.iter().find(|u| u.identity.id == *id))
        .map(|u| Roommate {
            name: u.identity.name.clone(),
            email: u.identity.email.clone(),
            phone: u.identity.phone.clone(),
        })
        .collect();

    Ok(Json(MyRoomResponse {
        room: Some(RoomDetails { room, roommates }),
        message: None,
    }))
}

// ── Complaints ──────────────────────────────────────────────────────────

async fn list_complaints(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Reply<Json<Vec<Complaint>>> {
    let user = authed(&state, &headers)?;
    let guard = state.lock().unwrap();
    let complaints = guard
        .complaints
        .iter()
        .filter(|c| user.role == Role::Admin || c.student_id == user.id)
        .cloned()
        .collect();
    Ok(Json(complaints))
}

async fn create_complaint(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<CreateComplaintRequest>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Student, "create complaints")?;
    let room_number = user.room_number.clone().ok_or((
        StatusCode::BAD_REQUEST,
        "You must be assigned to a room to create complaints".to_string(),
    ))?;

    state.lock().unwrap().complaints.push(Complaint {
        id: Uuid::new_v4(),
        student_id: user.id,
        student_name: user.name,
        room_number,
        title: req.title,
        description: req.description,
        category: req.category,
        status: ComplaintStatus::Pending,
        created_at: Utc::now(),
        resolved_at: None,
    });
    Ok(Json(MessageResponse {
        message: "Complaint submitted successfully".into(),
    }))
}

async fn set_complaint_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "update complaint status")?;
    let status: ComplaintStatus = params
        .get("status")
        .and_then(|s| s.parse().ok())
        .ok_or((StatusCode::BAD_REQUEST, "invalid status".to_string()))?;

    let mut guard = state.lock().unwrap();
    let complaint = guard
        .complaints
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Complaint not found".to_string()))?;
    complaint.status = status;
    if status == ComplaintStatus::Resolved {
        complaint.resolved_at = Some(Utc::now());
    }
    Ok(Json(MessageResponse {
        message: "Complaint status updated successfully".into(),
    }))
}

// ── Payments ────────────────────────────────────────────────────────────

async fn list_payments(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Reply<Json<Vec<Payment>>> {
    let user = authed(&state, &headers)?;
    let guard = state.lock().unwrap();
    let payments = guard
        .payments
        .iter()
        .filter(|p| user.role == Role::Admin || p.student_id == user.id)
        .cloned()
        .collect();
    Ok(Json(payments))
}

async fn create_payment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<CreatePaymentRequest>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "create payment records")?;

    let mut guard = state.lock().unwrap();
    let student_name = guard
        .users
        .iter()
        .find(|u| u.identity.id == req.student_id)
        .map(|u| u.identity.name.clone())
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))?;
    guard.payments.push(Payment {
        id: Uuid::new_v4(),
        student_id: req.student_id,
        student_name,
        amount: req.amount,
        month: req.month,
        year: req.year,
        payment_type: req.payment_type,
        status: PaymentStatus::Pending,
        due_date: req.due_date,
        paid_date: None,
    });
    Ok(Json(MessageResponse {
        message: "Payment record created successfully".into(),
    }))
}

async fn mark_payment_paid(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "mark payments as paid")?;

    let mut guard = state.lock().unwrap();
    let payment = guard
        .payments
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Payment not found".to_string()))?;
    payment.status = PaymentStatus::Paid;
    payment.paid_date = Some(Utc::now());
    Ok(Json(MessageResponse {
        message: "Payment marked as paid successfully".into(),
    }))
}

// ── Mess menu ───────────────────────────────────────────────────────────

async fn list_menu(State(state): State<Shared>, headers: HeaderMap) -> Reply<Json<Vec<MessMenu>>> {
    authed(&state, &headers)?;
    Ok(Json(state.lock().unwrap().menus.clone()))
}

async fn upsert_menu(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<UpsertMessMenuRequest>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "manage mess menu")?;

    let mut guard = state.lock().unwrap();
    if let Some(existing) = guard
        .menus
        .iter_mut()
        .find(|m| m.day == req.day && m.meal_type == req.meal_type)
    {
        existing.items = req.items;
        return Ok(Json(MessageResponse {
            message: "Menu updated successfully".into(),
        }));
    }
    guard.menus.push(MessMenu {
        id: Uuid::new_v4(),
        day: req.day,
        meal_type: req.meal_type,
        items: req.items,
    });
    Ok(Json(MessageResponse {
        message: "Menu created successfully".into(),
    }))
}

async fn delete_menu(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "manage mess menu")?;

    let mut guard = state.lock().unwrap();
    let before = guard.menus.len();
    guard.menus.retain(|m| m.id != id);
    if guard.menus.len() == before {
        return Err((StatusCode::NOT_FOUND, "Menu not found".into()));
    }
    Ok(Json(MessageResponse {
        message: "Menu deleted successfully".into(),
    }))
}

// ── Students ────────────────────────────────────────────────────────────

async fn list_students(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Reply<Json<Vec<Identity>>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "view all students")?;
    let guard = state.lock().unwrap();
    let students = guard
        .users
        .iter()
        .filter(|u| u.identity.role == Role::Student)
        .map(|u| u.identity.clone())
        .collect();
    Ok(Json(students))
}

async fn delete_student(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "delete students")?;

    let mut guard = state.lock().unwrap();
    let student = guard
        .users
        .iter()
        .find(|u| u.identity.id == id)
        .map(|u| u.identity.clone())
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))?;
    if let Some(room_number) = &student.room_number
        && let Some(room) = guard.rooms.iter_mut().find(|r| &r.room_number == room_number)
    {
        room.students.retain(|s| *s != id);
        room.occupied = room.occupied.saturating_sub(1);
        room.status = RoomStatus::Available;
    }
    guard.users.retain(|u| u.identity.id != id);
    Ok(Json(MessageResponse {
        message: "Student deleted successfully".into(),
    }))
}

// ── Files ───────────────────────────────────────────────────────────────

async fn upload_file(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply<Json<UploadFileResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Student, "upload files")?;
    if state.lock().unwrap().fail_uploads {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "simulated upload failure".into(),
        ));
    }

    let mut file_bytes = None;
    let mut original_name = None;
    let mut file_type = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                original_name = field.file_name().map(str::to_string);
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
                );
            }
            Some("file_type") => {
                file_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let slot: DocumentSlot = file_type
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or((StatusCode::BAD_REQUEST, "Invalid file type".to_string()))?;
    let bytes = file_bytes.ok_or((StatusCode::BAD_REQUEST, "missing file".to_string()))?;
    if bytes.len() as u64 > 5 * 1024 * 1024 {
        return Err((
            StatusCode::BAD_REQUEST,
            "File size too large (max 5MB)".into(),
        ));
    }
    let original = original_name.unwrap_or_default();
    let extension = original
        .rfind('.')
        .map(|idx| original[idx..].to_ascii_lowercase())
        .unwrap_or_default();
    if !matches!(extension.as_str(), ".jpg" | ".jpeg" | ".png" | ".pdf") {
        return Err((
            StatusCode::BAD_REQUEST,
            "Invalid file format. Only JPG, PNG, and PDF files are allowed".into(),
        ));
    }

    let file_id = Uuid::new_v4();
    let filename = format!("{slot}_{file_id}{extension}");
    state
        .lock()
        .unwrap()
        .files
        .insert((user.id, filename.clone()), bytes.to_vec());

    Ok(Json(UploadFileResponse {
        message: "File uploaded successfully".into(),
        file_id,
        filename: filename.clone(),
        file_type: slot,
        file_path: format!("/uploads/{}/{}", user.id, filename),
    }))
}

async fn download_file(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((student_id, filename)): Path<(Uuid, String)>,
) -> Reply<Response> {
    let user = authed(&state, &headers)?;
    if user.role == Role::Student && user.id != student_id {
        return Err((StatusCode::FORBIDDEN, "Access denied".into()));
    }
    let guard = state.lock().unwrap();
    if guard.fail_downloads {
        let chunks = futures_util::stream::iter([
            Ok::<Vec<u8>, std::io::Error>(b"partial".to_vec()),
            Err(std::io::Error::other("connection dropped")),
        ]);
        return Ok(Body::from_stream(chunks).into_response());
    }
    let bytes = guard
        .files
        .get(&(student_id, filename))
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "File not found".to_string()))?;
    Ok(bytes.into_response())
}

// ── Renewal forms ───────────────────────────────────────────────────────

async fn list_forms(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Reply<Json<Vec<RenewalForm>>> {
    let user = authed(&state, &headers)?;
    let guard = state.lock().unwrap();
    let forms = guard
        .forms
        .iter()
        .filter(|f| user.role == Role::Admin || f.student_id == user.id)
        .cloned()
        .collect();
    Ok(Json(forms))
}

async fn create_form(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<CreateRenewalFormRequest>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Student, "create renewal forms")?;
    let room_number = user.room_number.clone().ok_or((
        StatusCode::BAD_REQUEST,
        "You must be assigned to a room to submit a renewal form".to_string(),
    ))?;

    let mut guard = state.lock().unwrap();
    let has_pending = guard
        .forms
        .iter()
        .any(|f| f.student_id == user.id && !f.status.is_terminal());
    if has_pending {
        return Err((
            StatusCode::BAD_REQUEST,
            "You already have a pending renewal form".into(),
        ));
    }

    guard.forms.push(RenewalForm {
        id: Uuid::new_v4(),
        student_id: user.id,
        student_name: user.name,
        room_number,
        status: RenewalStatus::Submitted,
        files: req.files,
        admin_comments: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        reviewed_at: None,
        reviewed_by: None,
    });
    Ok(Json(MessageResponse {
        message: "Renewal form submitted successfully".into(),
    }))
}

async fn get_form(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Reply<Json<RenewalForm>> {
    let user = authed(&state, &headers)?;
    let guard = state.lock().unwrap();
    let form = guard
        .forms
        .iter()
        .find(|f| f.id == id)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "Renewal form not found".to_string()))?;
    if user.role == Role::Student && form.student_id != user.id {
        return Err((StatusCode::FORBIDDEN, "Access denied".into()));
    }
    Ok(Json(form))
}

async fn review_form(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<RenewalReviewRequest>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Admin, "review renewal forms")?;

    let mut guard = state.lock().unwrap();
    let form = guard
        .forms
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Renewal form not found".to_string()))?;
    form.updated_at = Utc::now();
    if let Some(status) = req.status {
        form.status = status;
        if status.is_terminal() {
            form.reviewed_at = Some(Utc::now());
            form.reviewed_by = Some(user.email.clone());
        }
    }
    if let Some(comments) = req.admin_comments {
        form.admin_comments = Some(comments);
    }
    Ok(Json(MessageResponse {
        message: "Renewal form updated successfully".into(),
    }))
}

async fn update_form_files(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(files): Json<BTreeMap<DocumentSlot, String>>,
) -> Reply<Json<MessageResponse>> {
    let user = authed(&state, &headers)?;
    require_role(&user, Role::Student, "update files")?;

    let mut guard = state.lock().unwrap();
    let form = guard
        .forms
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Renewal form not found".to_string()))?;
    if form.student_id != user.id {
        return Err((StatusCode::FORBIDDEN, "Access denied".into()));
    }
    if form.status.is_terminal() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Cannot update approved or rejected renewal forms".into(),
        ));
    }

    form.files.extend(files);
    form.updated_at = Utc::now();
    // A resubmission pulls the form out of review.
    if form.status == RenewalStatus::UnderReview {
        form.status = RenewalStatus::Submitted;
    }
    Ok(Json(MessageResponse {
        message: "Renewal form files updated successfully".into(),
    }))
}

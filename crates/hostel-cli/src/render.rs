//! Plain-text table rendering for the dashboard screens.

use hostel_types::api::RoomDetails;
use hostel_types::models::{Complaint, DocumentSlot, Identity, MessMenu, Payment, RenewalForm, Room};

pub fn rooms(rooms: &[Room]) {
    if rooms.is_empty() {
        println!("no rooms");
        return;
    }
    println!(
        "{:<8} {:<8} {:<10} {:<6} {:<12} occupancy",
        "room", "type", "floor", "cap", "status"
    );
    for room in rooms {
        println!(
            "{:<8} {:<8} {:<10} {:<6} {:<12} {}/{}",
            room.room_number,
            room.room_type.to_string(),
            room.floor,
            room.capacity,
            format!("{:?}", room.status).to_lowercase(),
            room.occupied,
            room.capacity
        );
    }
}

pub fn room_details(details: &RoomDetails) {
    let room = &details.room;
    println!(
        "room {} - {} on floor {}, {}/{} occupied",
        room.room_number, room.room_type, room.floor, room.occupied, room.capacity
    );
    if details.roommates.is_empty() {
        println!("no roommates");
    } else {
        println!("roommates:");
        for mate in &details.roommates {
            println!(
                "  {} <{}>{}",
                mate.name,
                mate.email,
                mate.phone
                    .as_deref()
                    .map(|p| format!(" - {p}"))
                    .unwrap_or_default()
            );
        }
    }
}

pub fn complaints(complaints: &[Complaint]) {
    if complaints.is_empty() {
        println!("no complaints");
        return;
    }
    for complaint in complaints {
        println!(
            "{}  [{}] {} - {} (room {}, {})",
            complaint.id,
            complaint.status,
            complaint.title,
            complaint.category,
            complaint.room_number,
            complaint.created_at.format("%Y-%m-%d")
        );
        println!("    {}", complaint.description);
    }
}

pub fn payments(payments: &[Payment]) {
    if payments.is_empty() {
        println!("no payments");
        return;
    }
    println!(
        "{:<38} {:<18} {:<10} {:<10} {:<12} due",
        "id", "type", "amount", "status", "period"
    );
    for payment in payments {
        println!(
            "{:<38} {:<18} {:<10.2} {:<10} {:<12} {}",
            payment.id.to_string(),
            payment.payment_type.to_string(),
            payment.amount,
            payment.status.to_string(),
            format!("{} {}", payment.month, payment.year),
            payment.due_date
        );
    }
}

pub fn mess_menu(menu: &[MessMenu]) {
    if menu.is_empty() {
        println!("no menu published");
        return;
    }
    for entry in menu {
        println!("{} / {}: {}", entry.day, entry.meal_type, entry.items.join(", "));
    }
}

pub fn students(students: &[Identity]) {
    if students.is_empty() {
        println!("no students registered");
        return;
    }
    for student in students {
        println!(
            "{}  {} <{}>  room {}",
            student.id,
            student.name,
            student.email,
            student.room_number.as_deref().unwrap_or("-")
        );
    }
}

pub fn renewal_form(form: &RenewalForm) {
    println!(
        "application {} - {} (room {})",
        form.id, form.status, form.room_number
    );
    println!(
        "created {}  updated {}",
        form.created_at.format("%Y-%m-%d %H:%M"),
        form.updated_at.format("%Y-%m-%d %H:%M")
    );
    for slot in DocumentSlot::ALL {
        let mark = match form.files.get(&slot) {
            Some(name) => name.as_str(),
            None if slot.is_required() => "MISSING",
            None => "-",
        };
        println!("  {:<12} {}", slot.to_string(), mark);
    }
    if let Some(comments) = &form.admin_comments {
        println!("admin comments: {comments}");
    }
    if let (Some(at), Some(by)) = (&form.reviewed_at, &form.reviewed_by) {
        println!("reviewed {} by {}", at.format("%Y-%m-%d %H:%M"), by);
    }
}

pub fn renewal_list(forms: &[RenewalForm]) {
    if forms.is_empty() {
        println!("no applications");
        return;
    }
    println!(
        "{:<38} {:<22} {:<8} {:<14} files",
        "id", "student", "room", "status"
    );
    for form in forms {
        println!(
            "{:<38} {:<22} {:<8} {:<14} {}",
            form.id.to_string(),
            form.student_name,
            form.room_number,
            form.status.to_string(),
            form.files.len()
        );
    }
}

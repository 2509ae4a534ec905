// Application records and form inputs

pub mod forms;
pub mod records;

pub use forms::{CreateEventForm, SignInForm};
pub use records::{
    Attendee, ConciseEvent, Event, EventListing, JoinedAttendance, JoinedAttendanceDetail,
};

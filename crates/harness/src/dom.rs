//! The DOM contract consumed from the WardView console.
//!
//! These selectors and global page functions are a fixed interface; if the
//! application renames or removes one, the corresponding step fails.

pub mod app {
    pub const SHELL: &str = "#app";
}

pub mod nav {
    pub const DASHBOARD: &str = "a[href='#dashboard']";
    pub const PATIENTS: &str = "a[href='#patients']";
    pub const BEDS: &str = "a[href='#beds']";
    pub const MENU_TOGGLE: &str = "#menu-toggle";
    pub const DRAWER: &str = "#nav-drawer";
}

pub mod patients {
    pub const ADD_BUTTON: &str = "#add-patient-btn";
    pub const TABLE: &str = "#patient-table";
    pub const FIRST_ROW: &str = "#patient-table tbody tr:first-child";
}

pub mod form {
    pub const NAME: &str = "#patient-name";
    pub const GENDER: &str = "#patient-gender";
    pub const BIRTH_DATE: &str = "#patient-birthdate";
    pub const PHONE: &str = "#patient-phone";
    pub const ADDRESS: &str = "#patient-address";
    pub const SAVE: &str = "#save-patient-btn";
    pub const ERROR: &str = ".form-error";
}

pub mod modal {
    pub const PANEL: &str = ".modal-panel";
    pub const CLOSE: &str = ".modal-close";
}

pub mod views {
    pub const SCHEDULE: &str = "#schedule-view";
    pub const PERFORMANCE: &str = "#performance-view";
    pub const DEPARTMENTS: &str = "#department-list";
    pub const ROOM_DETAIL: &str = "#room-detail";
    pub const BED_BOARD: &str = "#bed-board";
    /// Present only when at least one bed is available.
    pub const ASSIGN_BED: &str = "#bed-board .bed-available .assign-bed-btn";
    pub const BED_DETAIL: &str = "#bed-detail";
}

/// Globally-reachable page functions for UI states that have no dedicated
/// clickable trigger.
pub mod page_fn {
    pub const SHOW_SCHEDULE: &str = "showSchedule";
    pub const SHOW_PERFORMANCE: &str = "showPerformance";
    pub const SHOW_DEPARTMENTS: &str = "showDepartments";
    pub const SHOW_ROOM_DETAIL: &str = "showRoomDetail";
    pub const SHOW_BED_DETAIL: &str = "showBedDetail";
    pub const TOGGLE_PATIENT_STATUS: &str = "togglePatientStatus";
}

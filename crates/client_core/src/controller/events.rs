//! Navigation and alert events emitted by screen controllers.

/// Destinations a controller can ask the navigation stack for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Back,
    /// Confirmation screen; `date` is the booked time in epoch milliseconds.
    AppointmentCreated { date: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: &'static str,
}

impl Alert {
    pub const CREATE_APPOINTMENT_FAILED: Alert = Alert {
        title: "Erro ao criar agendamento",
        message: "Ocorreu um erro ao tentar criar o agendamento, tente novamente!",
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Navigate(Route),
    Alert(Alert),
}

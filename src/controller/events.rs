use crate::client::ApiResult;
use crate::models::ShortenResponse;

/// Identifies one dispatched call; only the latest ticket of a lifecycle is honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ticket(u64);

impl Ticket {
    pub(crate) fn next(self) -> Self {
        Ticket(self.0 + 1)
    }
}

/// Resolution of a dispatched API call, delivered back to the controller
#[derive(Debug)]
pub enum ApiEvent {
    Shortened {
        ticket: Ticket,
        result: ApiResult<ShortenResponse>,
    },
    StatsFetched {
        ticket: Ticket,
        result: ApiResult<ShortenResponse>,
    },
}

impl ApiEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            ApiEvent::Shortened { ticket, .. } | ApiEvent::StatsFetched { ticket, .. } => *ticket,
        }
    }
}

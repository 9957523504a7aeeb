//! Reports.

use crate::client::{BreezeClient, Outcome};
use crate::error::ApiResult;
use crate::filter::Filter;
use crate::marshal;
use crate::model::{EventInfo, Quota, TransactionInfo};
use crate::request::ApiRequest;
use crate::xml::XmlNode;

/// Per-SCO quiz and attendance reports. Each returns `row` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoReport {
    QuizInteractions,
    QuizQuestionAnswers,
    QuizQuestionDistribution,
    QuizQuestionResponse,
    /// Takes no filter.
    QuizSummary,
    QuizTakers,
    MeetingAttendance,
}

impl ScoReport {
    pub fn action(self) -> &'static str {
        match self {
            Self::QuizInteractions => "report-quiz-interactions",
            Self::QuizQuestionAnswers => "report-quiz-question-answer-distribution",
            Self::QuizQuestionDistribution => "report-quiz-question-distribution",
            Self::QuizQuestionResponse => "report-quiz-question-response",
            Self::QuizSummary => "report-quiz-summary",
            Self::QuizTakers => "report-quiz-takers",
            Self::MeetingAttendance => "report-meeting-attendance",
        }
    }

    fn accepts_filter(self) -> bool {
        self != Self::QuizSummary
    }
}

impl BreezeClient {
    /// Events the logged-in user is registered for.
    pub fn my_events(&self) -> Outcome<Vec<EventInfo>> {
        self.fetch_list(ApiRequest::new("report-my-events"), "my-events/event", "event")
    }

    /// The account's quotas and their usage.
    pub fn quotas(&self) -> Outcome<Vec<Quota>> {
        self.fetch(ApiRequest::new("report-quotas"), |payload| {
            marshal::decode_all::<Quota>(payload.descendants("quota"), Some("quota")).map(Some)
        })
    }

    /// Every transaction on the account, one row per user and SCO.
    pub fn consolidated_transactions(&self, filter: Filter) -> Outcome<Vec<TransactionInfo>> {
        let request = ApiRequest::new("report-bulk-consolidated-transactions").params(filter);
        self.fetch(request, |payload| {
            marshal::decode_all::<TransactionInfo>(payload.descendants("row"), Some("row"))
                .map(Some)
        })
    }

    /// Quiz questions across the account, as raw `row` elements.
    pub fn bulk_questions(&self, filter: Filter) -> Outcome<Vec<XmlNode>> {
        let request = ApiRequest::new("report-bulk-questions").params(filter);
        self.fetch(request, rows)
    }

    /// A quiz or attendance report for one SCO, as raw `row` elements.
    pub fn sco_report(&self, kind: ScoReport, sco_id: &str, filter: Filter) -> Outcome<Vec<XmlNode>> {
        if let Err(envelope) = Self::require([("sco-id", Some(sco_id))]) {
            return Outcome::status(envelope);
        }
        let mut request = ApiRequest::new(kind.action()).param("sco-id", sco_id);
        if kind.accepts_filter() {
            request = request.params(filter);
        }
        self.fetch(request, rows)
    }
}

fn rows(payload: &XmlNode) -> ApiResult<Option<Vec<XmlNode>>> {
    Ok(Some(payload.descendants("row").into_iter().cloned().collect()))
}

use super::TableRepository;
use crate::models::Feedback;

pub type FeedbackRepository = TableRepository<Feedback>;

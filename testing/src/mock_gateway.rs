//! Scripted in-memory [`Gateway`].
//!
//! Responses are queued per operation as raw JSON (bare or enveloped, exactly as the
//! real gateway might send them) or as errors. The last scripted response for an
//! operation keeps answering once the queue is down to one. Every call is recorded.

use serde::de::DeserializeOwned;
use serde_json::Value;
use stagepass_gateway::envelope::{decode_list, unwrap_list, unwrap_value};
use stagepass_gateway::{
    AuthGrant, Booking, BookingId, BookingReceipt, CancelReceipt, CreateBookingRequest,
    CreateReviewRequest, Gateway, GatewayError, GatewayFuture, GatewayResult, LoginRequest,
    PaymentRequest, PaymentResponse, Performance, PerformanceId, Review, ReviewId, SignupReceipt,
    SignupRequest, UpdateReviewRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Gateway operations that can be scripted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `signup`
    Signup,
    /// `login`
    Login,
    /// `list_performances`
    ListPerformances,
    /// `get_performance`
    GetPerformance,
    /// `create_booking`
    CreateBooking,
    /// `my_bookings`
    MyBookings,
    /// `cancel_booking`
    CancelBooking,
    /// `execute_payment`
    ExecutePayment,
    /// `create_review`
    CreateReview,
    /// `my_reviews`
    MyReviews,
    /// `performance_reviews`
    PerformanceReviews,
    /// `update_review`
    UpdateReview,
    /// `delete_review`
    DeleteReview,
}

/// A call the mock received, with its arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    /// `signup`
    Signup(SignupRequest),
    /// `login`
    Login(LoginRequest),
    /// `list_performances`
    ListPerformances,
    /// `get_performance`
    GetPerformance(PerformanceId),
    /// `create_booking`
    CreateBooking(CreateBookingRequest),
    /// `my_bookings`
    MyBookings,
    /// `cancel_booking`
    CancelBooking(BookingId),
    /// `execute_payment`
    ExecutePayment(PaymentRequest),
    /// `create_review`
    CreateReview(CreateReviewRequest),
    /// `my_reviews`
    MyReviews,
    /// `performance_reviews`
    PerformanceReviews(PerformanceId),
    /// `update_review`
    UpdateReview(ReviewId, UpdateReviewRequest),
    /// `delete_review`
    DeleteReview(ReviewId),
}

impl RecordedCall {
    /// Which operation this call was
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Signup(_) => Operation::Signup,
            Self::Login(_) => Operation::Login,
            Self::ListPerformances => Operation::ListPerformances,
            Self::GetPerformance(_) => Operation::GetPerformance,
            Self::CreateBooking(_) => Operation::CreateBooking,
            Self::MyBookings => Operation::MyBookings,
            Self::CancelBooking(_) => Operation::CancelBooking,
            Self::ExecutePayment(_) => Operation::ExecutePayment,
            Self::CreateReview(_) => Operation::CreateReview,
            Self::MyReviews => Operation::MyReviews,
            Self::PerformanceReviews(_) => Operation::PerformanceReviews,
            Self::UpdateReview(..) => Operation::UpdateReview,
            Self::DeleteReview(_) => Operation::DeleteReview,
        }
    }
}

#[derive(Default)]
struct Script {
    responses: HashMap<Operation, VecDeque<GatewayResult<Value>>>,
    calls: Vec<RecordedCall>,
}

/// In-memory gateway double
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stagepass_gateway::Gateway;
/// use stagepass_testing::mock_gateway::{MockGateway, Operation};
///
/// futures::executor::block_on(async {
///     let gateway = MockGateway::new();
///     gateway.respond(Operation::ListPerformances, json!({ "success": true, "data": [] }));
///
///     assert!(gateway.list_performances().await.unwrap().is_empty());
///     assert_eq!(gateway.calls_to(Operation::ListPerformances), 1);
/// });
/// ```
#[derive(Clone, Default)]
pub struct MockGateway {
    script: Arc<Mutex<Script>>,
}

impl MockGateway {
    /// A gateway with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body for `operation`
    pub fn respond(&self, operation: Operation, body: Value) -> &Self {
        self.enqueue(operation, Ok(body))
    }

    /// Queue a failure for `operation`
    pub fn fail(&self, operation: Operation, error: GatewayError) -> &Self {
        self.enqueue(operation, Err(error))
    }

    /// Every call received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// How many times `operation` was called
    #[must_use]
    pub fn calls_to(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// The most recent call, if any
    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().calls.last().cloned()
    }

    fn enqueue(&self, operation: Operation, response: GatewayResult<Value>) -> &Self {
        self.lock()
            .responses
            .entry(operation)
            .or_default()
            .push_back(response);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_response(&self, call: RecordedCall) -> GatewayResult<Value> {
        let operation = call.operation();
        let mut script = self.lock();
        script.calls.push(call);

        let Some(queue) = script.responses.get_mut(&operation) else {
            return Err(GatewayError::transport(format!(
                "no response scripted for {operation:?}"
            )));
        };
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.unwrap_or_else(|| {
            Err(GatewayError::transport(format!(
                "no response scripted for {operation:?}"
            )))
        })
    }

    fn answer<T>(&self, call: RecordedCall) -> GatewayFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let result = self
            .next_response(call)
            .and_then(unwrap_value)
            .and_then(|value| serde_json::from_value(value).map_err(GatewayError::from));
        Box::pin(std::future::ready(result))
    }

    fn answer_list<T>(&self, call: RecordedCall) -> GatewayFuture<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let result = self
            .next_response(call)
            .and_then(unwrap_list)
            .map(decode_list);
        Box::pin(std::future::ready(result))
    }
}

impl Gateway for MockGateway {
    fn signup(&self, request: SignupRequest) -> GatewayFuture<SignupReceipt> {
        self.answer(RecordedCall::Signup(request))
    }

    fn login(&self, request: LoginRequest) -> GatewayFuture<AuthGrant> {
        self.answer(RecordedCall::Login(request))
    }

    fn list_performances(&self) -> GatewayFuture<Vec<Performance>> {
        self.answer_list(RecordedCall::ListPerformances)
    }

    fn get_performance(&self, id: PerformanceId) -> GatewayFuture<Performance> {
        self.answer(RecordedCall::GetPerformance(id))
    }

    fn create_booking(&self, request: CreateBookingRequest) -> GatewayFuture<BookingReceipt> {
        self.answer(RecordedCall::CreateBooking(request))
    }

    fn my_bookings(&self) -> GatewayFuture<Vec<Booking>> {
        self.answer_list(RecordedCall::MyBookings)
    }

    fn cancel_booking(&self, id: BookingId) -> GatewayFuture<CancelReceipt> {
        self.answer(RecordedCall::CancelBooking(id))
    }

    fn execute_payment(&self, request: PaymentRequest) -> GatewayFuture<PaymentResponse> {
        self.answer(RecordedCall::ExecutePayment(request))
    }

    fn create_review(&self, request: CreateReviewRequest) -> GatewayFuture<Review> {
        self.answer(RecordedCall::CreateReview(request))
    }

    fn my_reviews(&self) -> GatewayFuture<Vec<Review>> {
        self.answer_list(RecordedCall::MyReviews)
    }

    fn performance_reviews(&self, id: PerformanceId) -> GatewayFuture<Vec<Review>> {
        self.answer_list(RecordedCall::PerformanceReviews(id))
    }

    fn update_review(&self, id: ReviewId, request: UpdateReviewRequest) -> GatewayFuture<Review> {
        self.answer(RecordedCall::UpdateReview(id, request))
    }

    fn delete_review(&self, id: ReviewId) -> GatewayFuture<()> {
        let result = self.next_response(RecordedCall::DeleteReview(id)).map(|_| ());
        Box::pin(std::future::ready(result))
    }
}

//! Order Numbers

use jiff::Timestamp;
use mockall::automock;
use rand::Rng;

use crate::domain::{orders::records::OrderNo, users::UserId};

/// Source of public order numbers.
///
/// Numbers only need to be unique with high probability; the `orders.order_no` unique
/// constraint turns the rare collision into a retryable error.
#[automock]
pub trait OrderNoGenerator: Send + Sync {
    fn generate(&self, user: UserId) -> OrderNo;
}

/// `YYYYMMDDHHMMSS` and milliseconds in UTC, the last four digits of the user id, then six
/// random digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampOrderNoGenerator;

impl TimestampOrderNoGenerator {
    fn compose(at: Timestamp, user: UserId, nonce: u32) -> OrderNo {
        OrderNo::new(format!(
            "{}{:03}{:04}{:06}",
            at.strftime("%Y%m%d%H%M%S"),
            at.subsec_millisecond(),
            user.into_i64().rem_euclid(10_000),
            nonce % 1_000_000,
        ))
    }
}

impl OrderNoGenerator for TimestampOrderNoGenerator {
    fn generate(&self, user: UserId) -> OrderNo {
        let nonce = rand::thread_rng().gen_range(0..1_000_000);

        Self::compose(Timestamp::now(), user, nonce)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn order_no_layout() -> TestResult {
        let at: Timestamp = "2026-10-16T08:09:10.123Z".parse()?;

        let order_no = TimestampOrderNoGenerator::compose(at, UserId::from_i64(123_456), 42);

        assert_eq!(order_no.as_str(), "202610160809101233456000042");

        Ok(())
    }

    #[test]
    fn short_user_ids_are_zero_padded() -> TestResult {
        let at: Timestamp = "2026-01-02T03:04:05Z".parse()?;

        let order_no = TimestampOrderNoGenerator::compose(at, UserId::from_i64(7), 0);

        assert_eq!(order_no.as_str(), "202601020304050000007000000");

        Ok(())
    }

    #[test]
    fn generated_numbers_are_digits_only() {
        let order_no = TimestampOrderNoGenerator.generate(UserId::from_i64(99));

        assert_eq!(order_no.as_str().len(), 27);
        assert!(order_no.as_str().bytes().all(|b| b.is_ascii_digit()));
    }
}

use rust_decimal::{Decimal, MathematicalOps};

use crate::core::jalali;
use crate::core::money::{self, INTEREST_SCALE};
use crate::modules::installments::models::ScheduledPayment;
use crate::modules::loans::models::LoanTerms;

/// Declining-balance amortization with a fixed level payment, degrading to
/// straight-line when the rate is zero.
///
/// Stateless and pure: safe to share and to call concurrently. The
/// calculator never fails for terms satisfying [`LoanTerms::validate`]; its
/// only non-exceptional shortcut is `term_months <= 0`, which yields an
/// empty schedule.
#[derive(Debug, Clone, Copy)]
pub struct AmortizationCalculator {
    /// Decimal places for intermediate interest values. Amounts intended for
    /// storage are always rounded to [`money::AMOUNT_SCALE`]; interest is first
    /// computed at this wider precision so drift cannot leak into the
    /// principal/interest split. Without the two tiers the final installment
    /// stops retiring the balance exactly for some rate/term combinations.
    interest_scale: u32,
}

impl Default for AmortizationCalculator {
    fn default() -> Self {
        Self {
            interest_scale: INTEREST_SCALE,
        }
    }
}

impl AmortizationCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the intermediate interest precision (property tests sweep
    /// this to verify the balance still zeroes out)
    pub fn with_interest_precision(interest_scale: u32) -> Self {
        Self { interest_scale }
    }

    /// Produce the full schedule for one loan.
    ///
    /// Due dates advance month-wise in the Jalali calendar: installment `i`
    /// falls `i - 1` Jalali months after the first payment date, with the day
    /// of month clamped down where the target month is shorter. Each carried
    /// balance is rounded to [`money::AMOUNT_SCALE`] per step, and the final
    /// installment's principal is forced to the carried balance exactly so
    /// accumulated rounding drift ends up there and nowhere else.
    pub fn schedule(&self, terms: &LoanTerms) -> Vec<ScheduledPayment> {
        if terms.term_months <= 0 {
            return Vec::new();
        }

        let term = terms.term_months;
        let monthly_rate = terms.annual_rate_percent / Decimal::from(100) / Decimal::from(12);

        let level_payment = if monthly_rate.is_zero() {
            money::round_amount(terms.principal / Decimal::from(term))
        } else {
            // principal * r / (1 - (1 + r)^-n), written with a positive
            // exponent as principal * r * f / (f - 1)
            let factor = (Decimal::ONE + monthly_rate).powi(term as i64);
            terms.principal * monthly_rate * factor / (factor - Decimal::ONE)
        };

        let mut schedule = Vec::with_capacity(term as usize);
        let mut balance = terms.principal;

        for i in 1..=term {
            let interest = (balance * monthly_rate).round_dp(self.interest_scale);

            let (amount_total, amount_principal) = if i == term {
                // Final installment retires the carried balance exactly
                let principal_part = balance;
                (money::round_amount(interest + principal_part), principal_part)
            } else {
                (
                    money::round_amount(level_payment),
                    money::round_amount(level_payment - interest),
                )
            };

            balance = money::round_amount(balance - amount_principal);

            // Conversion only fails for pre-epoch dates, which LoanTerms
            // validation rejects; day clamping itself is total
            let due_date = match jalali::add_months_gregorian(terms.first_payment_date, i - 1) {
                Ok(date) => date,
                Err(e) => {
                    debug_assert!(false, "unvalidated first payment date: {e}");
                    terms.first_payment_date
                }
            };

            schedule.push(ScheduledPayment {
                sequence_number: i,
                due_date,
                amount_total,
                amount_principal,
                amount_interest: money::round_amount(interest),
                remaining_balance: balance,
            });
        }

        schedule
    }
}

// Amortization engine tests: the concrete scheduling scenarios plus
// property-based checks of the schedule invariants (exact balance zeroing,
// principal/interest split consistency, Jalali month-wise due dates).

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vamyar::core::jalali::add_months_gregorian;
use vamyar::installments::AmortizationCalculator;
use vamyar::loans::LoanTerms;

fn terms(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: i32,
    first_payment_date: NaiveDate,
) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate_percent,
        term_months,
        first_payment_date,
    }
}

fn first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Zero-interest loan degrades to straight-line: twelve equal installments
#[test]
fn test_zero_interest_straight_line() {
    let calculator = AmortizationCalculator::new();
    let schedule = calculator.schedule(&terms(dec!(1_200_000), dec!(0), 12, first_date()));

    assert_eq!(schedule.len(), 12);
    for payment in &schedule {
        assert_eq!(payment.amount_total, dec!(100000.00));
        assert_eq!(payment.amount_principal, dec!(100000.00));
        assert_eq!(payment.amount_interest, dec!(0.00));
    }
    assert_eq!(schedule[11].remaining_balance, Decimal::ZERO);
}

/// Single-installment loan: one month of interest on the full principal,
/// and the installment retires the whole balance
#[test]
fn test_single_installment() {
    let calculator = AmortizationCalculator::new();
    let schedule = calculator.schedule(&terms(dec!(10_000), dec!(12), 1, first_date()));

    assert_eq!(schedule.len(), 1);
    let only = &schedule[0];
    // 12% yearly is 1% monthly: 100.00 interest on 10,000
    assert_eq!(only.amount_interest, dec!(100.00));
    assert_eq!(only.amount_principal, dec!(10000));
    assert_eq!(only.amount_total, dec!(10100.00));
    assert_eq!(only.remaining_balance, Decimal::ZERO);
    assert_eq!(only.due_date, first_date());
}

/// Degenerate term yields an empty schedule, not an error
#[test]
fn test_non_positive_term_yields_empty_schedule() {
    let calculator = AmortizationCalculator::new();
    assert!(calculator
        .schedule(&terms(dec!(5_000), dec!(10), 0, first_date()))
        .is_empty());
    assert!(calculator
        .schedule(&terms(dec!(5_000), dec!(10), -3, first_date()))
        .is_empty());
}

/// A first payment date the calendar bridge cannot represent trips the
/// debug assertion instead of silently collapsing every due date
#[test]
#[should_panic(expected = "unvalidated first payment date")]
#[cfg(debug_assertions)]
fn test_pre_epoch_first_payment_date_asserts_in_debug() {
    let pre_epoch = NaiveDate::from_ymd_opt(1599, 1, 1).unwrap();
    let calculator = AmortizationCalculator::new();
    calculator.schedule(&terms(dec!(10_000), dec!(12), 2, pre_epoch));
}

/// The final installment absorbs rounding drift: every earlier payment is
/// the level payment, and the last one differs only by cents
#[test]
fn test_final_installment_absorbs_drift() {
    let calculator = AmortizationCalculator::new();
    let schedule = calculator.schedule(&terms(dec!(100_000), dec!(18.5), 36, first_date()));

    assert_eq!(schedule.len(), 36);

    let level = schedule[0].amount_total;
    for payment in &schedule[..35] {
        assert_eq!(payment.amount_total, level);
    }

    let last = &schedule[35];
    assert_eq!(last.remaining_balance, Decimal::ZERO);
    assert!(
        (last.amount_total - level).abs() < dec!(1.00),
        "final payment {} strays from level payment {}",
        last.amount_total,
        level
    );
}

/// Due dates advance one Jalali month at a time, with day clamping.
/// 2024-01-21 is 1402-11-01; six installments stay on day 1 of consecutive
/// Jalali months even as the Gregorian day drifts.
#[test]
fn test_due_dates_follow_jalali_months() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
    let calculator = AmortizationCalculator::new();
    let schedule = calculator.schedule(&terms(dec!(60_000), dec!(24), 6, start));

    for (i, payment) in schedule.iter().enumerate() {
        assert_eq!(
            payment.due_date,
            add_months_gregorian(start, i as i32).unwrap()
        );
    }

    for pair in schedule.windows(2) {
        assert!(pair[0].due_date < pair[1].due_date);
    }
}

proptest! {
    /// Schedule length always equals the term
    #[test]
    fn prop_schedule_length(
        principal_cents in 0u64..=1_000_000_000,
        rate_tenths in 0u32..=400,
        term in 1i32..=120,
    ) {
        let calculator = AmortizationCalculator::new();
        let schedule = calculator.schedule(&terms(
            Decimal::new(principal_cents as i64, 2),
            Decimal::new(rate_tenths as i64, 1),
            term,
            first_date(),
        ));
        prop_assert_eq!(schedule.len(), term as usize);
    }

    /// The last installment leaves exactly zero balance, and the balance
    /// never increases along the way
    #[test]
    fn prop_balance_zeroes_and_never_increases(
        principal_cents in 1u64..=1_000_000_000,
        rate_tenths in 0u32..=400,
        term in 1i32..=120,
    ) {
        let calculator = AmortizationCalculator::new();
        let schedule = calculator.schedule(&terms(
            Decimal::new(principal_cents as i64, 2),
            Decimal::new(rate_tenths as i64, 1),
            term,
            first_date(),
        ));

        prop_assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);

        let mut previous = Decimal::new(principal_cents as i64, 2);
        for payment in &schedule {
            prop_assert!(payment.remaining_balance <= previous);
            previous = payment.remaining_balance;
        }
    }

    /// Principal plus interest equals the total on every line (to rounding
    /// precision)
    #[test]
    fn prop_split_consistency(
        principal_cents in 1u64..=1_000_000_000,
        rate_tenths in 0u32..=400,
        term in 1i32..=120,
    ) {
        let calculator = AmortizationCalculator::new();
        let schedule = calculator.schedule(&terms(
            Decimal::new(principal_cents as i64, 2),
            Decimal::new(rate_tenths as i64, 1),
            term,
            first_date(),
        ));

        for payment in &schedule {
            let drift = payment.amount_principal + payment.amount_interest - payment.amount_total;
            prop_assert!(drift.abs() < dec!(0.01), "split drift {} at {}", drift, payment.sequence_number);
        }
    }

    /// The balance-zero invariant holds across intermediate interest
    /// precisions (the knob exists exactly so this can be swept)
    #[test]
    fn prop_balance_zeroes_across_precisions(
        principal_cents in 1u64..=100_000_000,
        rate_tenths in 1u32..=400,
        term in 1i32..=60,
        interest_scale in 6u32..=14,
    ) {
        let calculator = AmortizationCalculator::with_interest_precision(interest_scale);
        let schedule = calculator.schedule(&terms(
            Decimal::new(principal_cents as i64, 2),
            Decimal::new(rate_tenths as i64, 1),
            term,
            first_date(),
        ));

        prop_assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    /// Due dates are strictly increasing and follow the Jalali month-wise
    /// advance of the first payment date
    #[test]
    fn prop_due_dates_monotone(
        term in 1i32..=60,
        start_offset in 0i64..20_000,
    ) {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
            + chrono::Days::new(start_offset as u64);
        let calculator = AmortizationCalculator::new();
        let schedule = calculator.schedule(&terms(dec!(50_000), dec!(15), term, start));

        for (i, payment) in schedule.iter().enumerate() {
            prop_assert_eq!(payment.due_date, add_months_gregorian(start, i as i32).unwrap());
        }
        for pair in schedule.windows(2) {
            prop_assert!(pair[0].due_date < pair[1].due_date);
        }
    }
}

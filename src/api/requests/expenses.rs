use super::FromFields;
use crate::api::form::{FieldCheck, Fields};
use crate::database::models::{ExpenseFields, ExpenseFilter, NewExpense, BUDGET_CURRENCY};
use crate::error::ApiError;

fn currency(check: &mut FieldCheck<'_>, name: &str) -> Option<String> {
    let code = check.text(name)?.to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        check.reject(name, "must be a three-letter currency code");
        return None;
    }
    Some(code)
}

fn expense_fields(check: &mut FieldCheck<'_>) -> ExpenseFields {
    let trip_spot_id = check.integer("trip_spot_id");
    let category = check.required_text("category");
    let description = check.text_or_empty("description");

    let amount = check.number("amount");
    match amount {
        None => check.reject("amount", "is required"),
        Some(value) if value <= 0.0 => check.reject("amount", "must be greater than 0"),
        Some(_) => {}
    }

    let currency = currency(check, "currency").unwrap_or_else(|| BUDGET_CURRENCY.to_string());
    let date = check.required_date("date");

    ExpenseFields {
        trip_spot_id,
        category,
        description,
        amount: amount.unwrap_or_default(),
        currency,
        date,
        payment_method: check.text_or_empty("payment_method"),
        receipt_image: None,
    }
}

impl FromFields for ExpenseFields {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let expense = expense_fields(&mut check);
        check.finish()?;
        Ok(expense)
    }
}

impl FromFields for NewExpense {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let trip_id = check.required_integer("trip_id");
        let expense = expense_fields(&mut check);
        check.finish()?;
        Ok(NewExpense {
            trip_id,
            fields: expense,
        })
    }
}

impl FromFields for ExpenseFilter {
    fn from_fields(fields: &Fields) -> Result<Self, ApiError> {
        let mut check = FieldCheck::new(fields);
        let filter = ExpenseFilter {
            trip_id: check.integer("trip_id"),
            category: check.text("category"),
            currency: currency(&mut check, "currency"),
        };
        check.finish()?;
        Ok(filter)
    }
}

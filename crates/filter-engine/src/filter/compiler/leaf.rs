use super::FilterCompiler;
use crate::{
    dates::{
        calendar::{financial_quarter_months, shift_days},
        range_type::RangeType,
        resolve_range,
    },
    error::{FilterError, Result},
    filter::{
        field::{FieldKind, ResolvedField},
        operator::Operator,
        period::PeriodData,
        tree::{FilterGroup, FilterLeaf, LeafKind},
        value::{LeafValue, QuarterRef, literal, literal_list},
    },
};
use chrono::{Months, NaiveDate, NaiveTime};
use model::core::value::Value;
use planner::query::ast::expr::{BinaryOperator, DatePart, Expr};
use tracing::debug;

impl FilterCompiler<'_> {
    pub(super) fn compile_leaf(
        &self,
        leaf: &FilterLeaf,
        group: &FilterGroup,
        period: &mut PeriodData,
    ) -> Result<Expr> {
        let field = self.resolve_field(&leaf.field)?;
        check_operator(leaf, &field)?;
        debug!(
            "Compiling leaf '{}': {} {} {}",
            leaf.id,
            field.path,
            leaf.operator,
            leaf.kind.describe()
        );

        match &leaf.value {
            LeafValue::NullCheck => Ok(field.expr().is_null(leaf.operator == Operator::IsNotNull)),
            LeafValue::Literal(raw) => plain(leaf, &field, raw),
            LeafValue::Range(range) => self.variable_date(leaf, &field, *range, period),
            LeafValue::Year(year) if leaf.kind == LeafKind::FinancialVariableYear => {
                self.financial_year(leaf, &field, *year, period)
            }
            LeafValue::Year(year) => variable_year(leaf, &field, *year, period),
            LeafValue::Month(month) => Ok(signed(
                leaf,
                field.expr().extract(DatePart::Month).eq(Value::Int(i64::from(*month))),
                &[&field],
            )),
            LeafValue::Quarter(quarter) => Ok(self.quarter(leaf, &field, *quarter)),
            LeafValue::Weekday(day) => Ok(signed(
                leaf,
                field.expr().extract(DatePart::Weekday).eq(Value::Int(i64::from(*day))),
                &[&field],
            )),
            LeafValue::Week(week) if leaf.kind == LeafKind::FinancialWeekNumber => {
                self.financial_week(leaf, &field, *week, group)
            }
            LeafValue::Week(week) => week_number(leaf, &field, *week),
            LeafValue::CurrentUser(wants_user) => self.logged_in_user(leaf, &field, *wants_user),
            LeafValue::Field(other) => self.field_vs_field(leaf, &field, other),
        }
    }

    fn variable_date(
        &self,
        leaf: &FilterLeaf,
        field: &ResolvedField,
        range: RangeType,
        period: &mut PeriodData,
    ) -> Result<Expr> {
        let spec = resolve_range(range, self.ctx.today(), self.ctx.financial_year_start_month())?;
        let (start, end) = match field.kind {
            FieldKind::Date => (Value::Date(spec.start_date()), Value::Date(spec.end_date())),
            _ => (Value::TimestampNaive(spec.start), Value::TimestampNaive(spec.end)),
        };
        let column = field.expr();

        let expr = match leaf.operator {
            Operator::Less => {
                period.record(spec.start);
                column.compare(BinaryOperator::Lt, start)
            }
            Operator::GreaterOrEqual => {
                period.record(spec.start);
                period.record(spec.end);
                column.compare(BinaryOperator::GtEq, start)
            }
            Operator::Greater => {
                period.record(spec.end);
                column.compare(BinaryOperator::Gt, end)
            }
            Operator::LessOrEqual => {
                period.record(spec.start);
                period.record(spec.end);
                column.compare(BinaryOperator::LtEq, end)
            }
            Operator::NotEqual | Operator::NotIn => negate(column.between(start, end), &[field]),
            _ => {
                period.record(spec.start);
                period.record(spec.end);
                column.between(start, end)
            }
        };
        Ok(expr)
    }

    fn financial_year(
        &self,
        leaf: &FilterLeaf,
        field: &ResolvedField,
        year: i32,
        period: &mut PeriodData,
    ) -> Result<Expr> {
        let start = financial_year_start(year, self.ctx.financial_year_start_month())?;
        let end = start
            .checked_add_months(Months::new(12))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| FilterError::DateOutOfRange(format!("financial year {year}")))?;
        let (start_value, end_value) = (day_start(field.kind, start), day_end(field.kind, end));
        let column = field.expr();

        let expr = match leaf.operator {
            Operator::Less => {
                period.record_date(start);
                column.compare(BinaryOperator::Lt, start_value)
            }
            Operator::LessOrEqual => {
                period.record_date(end);
                column.compare(BinaryOperator::LtEq, end_value)
            }
            Operator::Greater => {
                period.record_date(end);
                column.compare(BinaryOperator::Gt, end_value)
            }
            Operator::GreaterOrEqual => {
                period.record_date(start);
                column.compare(BinaryOperator::GtEq, start_value)
            }
            Operator::NotEqual | Operator::NotIn => {
                negate(column.between(start_value, end_value), &[field])
            }
            _ => {
                period.record_date(start);
                period.record_date(end);
                column.between(start_value, end_value)
            }
        };
        Ok(expr)
    }

    fn quarter(&self, leaf: &FilterLeaf, field: &ResolvedField, quarter: QuarterRef) -> Expr {
        let month = field.expr().extract(DatePart::Month);
        let expr = match quarter {
            QuarterRef::Calendar(n) => {
                let start_month = i64::from((n - 1) * 3);
                month
                    .clone()
                    .compare(BinaryOperator::Gt, Value::Int(start_month))
                    .and(month.compare(BinaryOperator::LtEq, Value::Int(start_month + 3)))
            }
            QuarterRef::Financial(n) => {
                let months = financial_quarter_months(self.ctx.financial_year_start_month(), n);
                month.in_list(months.iter().map(|m| Value::Int(i64::from(*m))).collect())
            }
        };
        signed(leaf, expr, &[field])
    }

    fn financial_week(
        &self,
        leaf: &FilterLeaf,
        field: &ResolvedField,
        week: i64,
        group: &FilterGroup,
    ) -> Result<Expr> {
        let fy_start = self
            .financial_year_anchor(group)?
            .ok_or(FilterError::MissingFinancialYear)?;
        if !(1..=53).contains(&week) {
            return Err(FilterError::FinancialWeekOutOfRange(week));
        }

        let week_start = shift_days(fy_start, (week - 1) * 7)
            .ok_or_else(|| FilterError::DateOutOfRange(format!("financial week {week}")))?;
        let week_end = shift_days(week_start, 7)
            .ok_or_else(|| FilterError::DateOutOfRange(format!("financial week {week}")))?;
        let (start, end) = (day_start(field.kind, week_start), day_start(field.kind, week_end));
        let column = field.expr();

        let half_open = |column: Expr, start: Value, end: Value| {
            column
                .clone()
                .compare(BinaryOperator::GtEq, start)
                .and(column.compare(BinaryOperator::Lt, end))
        };

        let expr = match leaf.operator {
            Operator::NotEqual => negate(half_open(column, start, end), &[field]),
            Operator::Less => column.compare(BinaryOperator::Lt, start),
            Operator::LessOrEqual => column.compare(BinaryOperator::Lt, end),
            Operator::Greater => column.compare(BinaryOperator::GtEq, end),
            Operator::GreaterOrEqual => column.compare(BinaryOperator::GtEq, start),
            _ => half_open(column, start, end),
        };
        Ok(expr)
    }

    /// Start of the financial year named by a sibling `equal` leaf: a variable
    /// date on a whole financial year, or a financial variable year.
    fn financial_year_anchor(&self, group: &FilterGroup) -> Result<Option<NaiveDate>> {
        let fy_month = self.ctx.financial_year_start_month();
        for sibling in group.leaves().filter(|l| l.operator == Operator::Equal) {
            match (sibling.kind, &sibling.value) {
                (LeafKind::VariableDate, LeafValue::Range(range)) if range.is_financial_year() => {
                    let spec = resolve_range(*range, self.ctx.today(), fy_month)?;
                    return Ok(Some(spec.start_date()));
                }
                (LeafKind::FinancialVariableYear, LeafValue::Year(year)) => {
                    return financial_year_start(*year, fy_month).map(Some);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn logged_in_user(&self, leaf: &FilterLeaf, field: &ResolvedField, wants_user: bool) -> Result<Expr> {
        let user = self
            .ctx
            .current_user()
            .cloned()
            .ok_or(FilterError::MissingLoggedInUser)?;
        let matches_user = field.expr().eq(user);

        let positive = match leaf.operator {
            Operator::Equal => wants_user,
            _ => !wants_user,
        };
        Ok(if positive {
            matches_user
        } else {
            negate(matches_user, &[field])
        })
    }

    fn field_vs_field(&self, leaf: &FilterLeaf, field: &ResolvedField, other_path: &str) -> Result<Expr> {
        let other = self.resolve_field(other_path)?;
        let op = leaf
            .operator
            .positive()
            .comparison()
            .ok_or_else(|| unsupported(leaf, field))?;
        let expr = Expr::binary(field.expr(), op, other.expr());
        Ok(signed(leaf, expr, &[field, &other]))
    }
}

fn plain(leaf: &FilterLeaf, field: &ResolvedField, raw: &serde_json::Value) -> Result<Expr> {
    let column = field.expr();
    let op = leaf.operator.positive();

    let expr = match op {
        Operator::Equal => match literal(&leaf.id, field.kind, raw)? {
            Value::Null => return Ok(column.is_null(leaf.operator.is_negated())),
            value => column.eq(value),
        },
        Operator::Less | Operator::LessOrEqual | Operator::Greater | Operator::GreaterOrEqual => {
            let cmp = op.comparison().ok_or_else(|| unsupported(leaf, field))?;
            let value = literal(&leaf.id, field.kind, raw)?;
            if value.is_null() {
                return Err(FilterError::malformed(&leaf.id, raw, "cannot order against null"));
            }
            column.compare(cmp, value)
        }
        Operator::Contains => column.ilike(format!("%{}%", like_text(leaf, raw)?)),
        Operator::BeginsWith => column.ilike(format!("{}%", like_text(leaf, raw)?)),
        Operator::EndsWith => column.ilike(format!("%{}", like_text(leaf, raw)?)),
        Operator::In => column.in_list(literal_list(&leaf.id, field.kind, raw)?),
        _ => return Err(unsupported(leaf, field)),
    };
    Ok(signed(leaf, expr, &[field]))
}

fn variable_year(leaf: &FilterLeaf, field: &ResolvedField, year: i32, period: &mut PeriodData) -> Result<Expr> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| FilterError::DateOutOfRange(format!("year {year}")))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| FilterError::DateOutOfRange(format!("year {year}")))?;
    let year_expr = field.expr().extract(DatePart::Year);
    let year_value = Value::Int(i64::from(year));

    let expr = match leaf.operator {
        op if op.is_ordering() => {
            match op {
                Operator::Greater => period.record_date(end),
                Operator::Less => period.record_date(start),
                _ => {
                    period.record_date(start);
                    period.record_date(end);
                }
            }
            let cmp = op.comparison().ok_or_else(|| unsupported(leaf, field))?;
            year_expr.compare(cmp, year_value)
        }
        Operator::NotEqual | Operator::NotIn => negate(year_expr.eq(year_value), &[field]),
        _ => {
            period.record_date(start);
            period.record_date(end);
            year_expr.eq(year_value)
        }
    };
    Ok(expr)
}

fn week_number(leaf: &FilterLeaf, field: &ResolvedField, week: i64) -> Result<Expr> {
    let cmp = leaf
        .operator
        .positive()
        .comparison()
        .ok_or_else(|| unsupported(leaf, field))?;
    let expr = field.expr().extract(DatePart::Week).compare(cmp, Value::Int(week));
    Ok(signed(leaf, expr, &[field]))
}

fn financial_year_start(year: i32, start_month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, start_month, 1)
        .ok_or_else(|| FilterError::DateOutOfRange(format!("financial year {year}")))
}

fn day_start(kind: FieldKind, date: NaiveDate) -> Value {
    match kind {
        FieldKind::Date => Value::Date(date),
        _ => Value::TimestampNaive(date.and_time(NaiveTime::MIN)),
    }
}

fn day_end(kind: FieldKind, date: NaiveDate) -> Value {
    match (kind, NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)) {
        (FieldKind::Date, _) | (_, None) => Value::Date(date),
        (_, Some(last)) => Value::TimestampNaive(date.and_time(last)),
    }
}

/// Negates the leaf as a whole when its operator is one of the `not_*` forms.
fn signed(leaf: &FilterLeaf, expr: Expr, fields: &[&ResolvedField]) -> Expr {
    if leaf.operator.is_negated() {
        negate(expr, fields)
    } else {
        expr
    }
}

/// `NOT (expr)`. Nullable columns are required to be present inside the
/// negation, so rows where they are NULL end up on the negated side.
fn negate(expr: Expr, fields: &[&ResolvedField]) -> Expr {
    fields
        .iter()
        .filter(|field| field.nullable)
        .fold(expr, |acc, field| acc.and(field.expr().is_null(true)))
        .not()
}

fn like_text(leaf: &FilterLeaf, raw: &serde_json::Value) -> Result<String> {
    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return Err(FilterError::malformed(&leaf.id, raw, "expected text to match")),
    };
    Ok(escape_like(&text))
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unsupported(leaf: &FilterLeaf, field: &ResolvedField) -> FilterError {
    FilterError::UnsupportedOperatorForType {
        operator: leaf.operator.to_string(),
        target: format!(
            "{} field '{}' compared with {}",
            field.kind.as_str(),
            field.path,
            leaf.kind.describe()
        ),
    }
}

fn check_operator(leaf: &FilterLeaf, field: &ResolvedField) -> Result<()> {
    use Operator::*;

    let op = leaf.operator;
    if op.is_null_check() {
        return Ok(());
    }
    let temporal = field.kind.is_temporal();
    let allowed = match leaf.kind {
        LeafKind::Plain => match field.kind {
            FieldKind::String => !op.is_ordering(),
            FieldKind::Number | FieldKind::Date | FieldKind::DateTime => {
                op.is_ordering() || matches!(op, Equal | NotEqual | In | NotIn)
            }
            FieldKind::Boolean | FieldKind::User => matches!(op, Equal | NotEqual),
            FieldKind::ForeignKey | FieldKind::MultipleChoice => matches!(op, Equal | NotEqual | In | NotIn),
        },
        LeafKind::VariableDate | LeafKind::VariableYear | LeafKind::FinancialVariableYear => {
            temporal && (op.is_ordering() || matches!(op, Equal | NotEqual | In | NotIn))
        }
        LeafKind::WeekNumber | LeafKind::FinancialWeekNumber => {
            temporal && (op.is_ordering() || matches!(op, Equal | NotEqual))
        }
        LeafKind::VariableMonth | LeafKind::VariableQuarter | LeafKind::VariableDay => {
            temporal && matches!(op, Equal | NotEqual | In | NotIn)
        }
        LeafKind::LoggedInUser => {
            matches!(field.kind, FieldKind::User | FieldKind::ForeignKey) && matches!(op, Equal | NotEqual)
        }
        LeafKind::FieldVsField => op.is_ordering() || matches!(op, Equal | NotEqual),
    };

    if allowed {
        Ok(())
    } else {
        Err(unsupported(leaf, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}

use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result go into a field/value table; embedded record
/// arrays (amortization and premium schedules) each get their own table
/// underneath, headed by the field name.
pub fn print_table(value: &Value) {
    let Some(map) = value.as_object() else {
        println!("{}", value);
        return;
    };

    let result = map.get("result").unwrap_or(value);

    match result {
        Value::Object(res_map) => {
            print_scalar_fields(res_map);
            for (key, val) in res_map {
                if let Value::Array(records) = val {
                    if records.first().map(Value::is_object).unwrap_or(false) {
                        println!("\n{}:", key);
                        print_records(records);
                    }
                }
            }
        }
        Value::Array(records) => print_records(records),
        other => println!("{}", other),
    }

    if let Some(Value::Array(warnings)) = map.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = map.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_scalar_fields(res_map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);

    let mut has_rows = false;
    for (key, val) in res_map {
        if matches!(val, Value::Array(_)) {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
        has_rows = true;
    }

    if has_rows {
        println!("{}", Table::from(builder));
    }
}

fn print_records(records: &[Value]) {
    if records.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = records.first() else {
        for record in records {
            println!("{}", format_value(record));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for record in records {
        if let Value::Object(map) = record {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

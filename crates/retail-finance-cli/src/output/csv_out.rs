use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// When the result embeds a single record array (an amortization or premium
/// schedule), that array becomes the CSV body — the shape downstream charting
/// and reporting tools consume. Anything else falls back to field,value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(records) = single_record_array(map) {
                write_records(&mut wtr, records);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    if matches!(val, Value::Array(_)) {
                        continue;
                    }
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(records) => write_records(&mut wtr, records),
        other => {
            let _ = wtr.write_record([&format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

/// The result's only array-of-records field, if there is exactly one.
fn single_record_array(map: &serde_json::Map<String, Value>) -> Option<&Vec<Value>> {
    let mut arrays = map.values().filter_map(|v| match v {
        Value::Array(records) if records.first().map(Value::is_object).unwrap_or(false) => {
            Some(records)
        }
        _ => None,
    });

    let first = arrays.next()?;
    if arrays.next().is_some() {
        return None;
    }
    Some(first)
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, records: &[Value]) {
    if records.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = records.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for record in records {
            if let Value::Object(map) = record {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for record in records {
            let _ = wtr.write_record([&format_csv_value(record)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

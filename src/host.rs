//! Default host library bound into the root frame.

use std::rc::Rc;

use crate::vm::{Value, Vm};

/// Render call arguments the way `print` shows them: space-separated.
pub fn format_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bind `print`, `string_len` and `array_len`, writing their output to stdout.
pub fn register_defaults(vm: &mut Vm) {
    register_defaults_with(vm, |line| println!("{}", line));
}

/// Bind the default host library, sending each output line to `sink`.
pub fn register_defaults_with<F>(vm: &mut Vm, sink: F)
where
    F: Fn(String) + 'static,
{
    let sink = Rc::new(sink);

    let out = Rc::clone(&sink);
    vm.register("print", move |args| out(format_args(args)));

    let out = Rc::clone(&sink);
    vm.register("string_len", move |args| {
        if let Some(s) = args.first().and_then(Value::as_str) {
            out(s.chars().count().to_string());
        }
    });

    let out = sink;
    vm.register("array_len", move |args| {
        if let Some(items) = args.first().and_then(Value::as_array) {
            out(items.len().to_string());
        }
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::vm::Type;

    fn capture() -> (Vm, Rc<RefCell<Vec<String>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let mut vm = Vm::new(Default::default());
        let sink = Rc::clone(&lines);
        register_defaults_with(&mut vm, move |line| sink.borrow_mut().push(line));
        (vm, lines)
    }

    #[test]
    fn test_format_args() {
        let args = [Value::string("port"), Value::integer(8080), Value::boolean(true)];
        assert_eq!(format_args(&args), "port 8080 true");
    }

    #[test]
    fn test_defaults_are_bound_as_functions() {
        let (vm, lines) = capture();
        for name in ["print", "string_len", "array_len"] {
            let function = vm.get(name).and_then(Value::as_function).unwrap();
            assert_eq!(function.name, name);
        }

        let len = vm.get("string_len").and_then(Value::as_function).unwrap();
        len.call(&[Value::string("héllo")]);
        let len = vm.get("array_len").and_then(Value::as_function).unwrap();
        len.call(&[Value::array(
            Type::array_of(Type::integer()),
            vec![Value::integer(1), Value::integer(2)],
        )]);
        assert_eq!(*lines.borrow(), vec!["5".to_string(), "2".to_string()]);
    }
}

/// Implement a binary operator for all ref cases after the implementation for the ref-ref case (assumes deref operator works)
macro_rules! impl_binop_ref_cases {
    (impl $imp:ident, $method:ident for $t:ty, $u:ty, $o:ty) => {
        impl $imp<$u> for &'_ $t {
            type Output = $o;

            #[inline]
            fn $method(self, other: $u) -> $o {
                $imp::$method(self, &other)
            }
        }

        impl<'a> $imp<&'a $u> for $t {
            type Output = $o;

            #[inline]
            fn $method(self, other: &'a $u) -> $o {
                $imp::$method(&self, other)
            }
        }

        impl $imp<$u> for $t {
            type Output = $o;

            #[inline]
            fn $method(self, other: $u) -> $o {
                $imp::$method(&self, &other)
            }
        }
    };
}

/// Split a comma separated list into trimmed non empty parts, with the byte offset of each part
pub(crate) fn split_with_offsets(text: &str, separator: char) -> Vec<(usize, &str)> {
    let mut output = Vec::new();
    let mut start = 0;
    for part in text.split(separator) {
        let trimmed_start = part.len() - part.trim_start().len();
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            output.push((start + trimmed_start, trimmed));
        }
        start += part.len() + separator.len_utf8();
    }
    output
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::split_with_offsets;

    #[test]
    fn split() {
        assert_eq!(
            split_with_offsets(" a, b ,,c", ','),
            vec![(1, "a"), (4, "b"), (8, "c")]
        );
        assert!(split_with_offsets("", ',').is_empty());
        assert!(split_with_offsets(" , ", ',').is_empty());
    }
}

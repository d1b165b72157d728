// Telemetry channel domain model
use serde::Serialize;

/// One tracked physical quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Flow,
    Humidity,
    Temperature,
    Pressure,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Flow,
        Channel::Humidity,
        Channel::Temperature,
        Channel::Pressure,
    ];

    /// Decimal places used for both the value display and the trend magnitude.
    pub fn precision(self) -> usize {
        match self {
            Channel::Flow => 2,
            Channel::Humidity | Channel::Temperature | Channel::Pressure => 1,
        }
    }

    /// Sparkline stroke color as `#rrggbb`.
    pub fn color(self) -> &'static str {
        match self {
            Channel::Flow => "#4cc9f0",
            Channel::Humidity => "#ffd166",
            Channel::Temperature => "#ef5350",
            Channel::Pressure => "#7bd4a5",
        }
    }

    /// Element id of the current-value text target.
    pub fn value_target(self) -> &'static str {
        match self {
            Channel::Flow => "flow",
            Channel::Humidity => "humidity",
            Channel::Temperature => "temperature",
            Channel::Pressure => "pressure",
        }
    }

    pub fn trend_target(self) -> &'static str {
        match self {
            Channel::Flow => "flow-trend",
            Channel::Humidity => "hum-trend",
            Channel::Temperature => "temp-trend",
            Channel::Pressure => "pressure-trend",
        }
    }

    pub fn format_value(self, value: f64) -> String {
        format!("{:.*}", self.precision(), value)
    }
}

/// Fixed-size map keyed by [`Channel`], iterated in [`Channel::ALL`] order.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap<T> {
    slots: [T; 4],
}

impl<T> ChannelMap<T> {
    pub fn from_fn(f: impl FnMut(Channel) -> T) -> Self {
        Self {
            slots: Channel::ALL.map(f),
        }
    }

    pub fn get(&self, channel: Channel) -> &T {
        &self.slots[channel as usize]
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        &mut self.slots[channel as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::ALL.into_iter().zip(self.slots.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_uses_channel_precision() {
        assert_eq!(Channel::Flow.format_value(12.345), "12.35");
        assert_eq!(Channel::Humidity.format_value(41.26), "41.3");
        assert_eq!(Channel::Pressure.format_value(101.0), "101.0");
    }

    #[test]
    fn test_channel_map_indexes_by_channel() {
        let mut map = ChannelMap::from_fn(|c| c.value_target().len());
        *map.get_mut(Channel::Pressure) = 0;

        assert_eq!(*map.get(Channel::Flow), 4);
        assert_eq!(*map.get(Channel::Pressure), 0);
        let order: Vec<Channel> = map.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Channel::ALL.to_vec());
    }
}

use std::fmt;

// Message classes understood by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Api,
    Cfg,
    Sys,
}

impl MessageClass {
    pub fn talker(self) -> &'static str {
        match self {
            MessageClass::Api => "PERDAPI",
            MessageClass::Cfg => "PERDCFG",
            MessageClass::Sys => "PERDSYS",
        }
    }

    // SYS requests are plain GETs without a trailing QUERY token.
    pub fn takes_query_token(self) -> bool {
        !matches!(self, MessageClass::Sys)
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.talker())
    }
}

#[derive(Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub class: MessageClass,
    pub summary: &'static str,
    pub get: Option<&'static str>,
    pub post: &'static [&'static str],
}

impl CommandSpec {
    // True when the receiver documents a GET form for this command.
    pub fn queryable(&self) -> bool {
        self.get.is_some()
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "GNSS",
        class: MessageClass::Api,
        summary: "select the satellite systems used for tracking",
        get: Some("GNSS,QUERY"),
        post: &["GNSS,TalkerID,Gps,Glonass,Galileo,Qzss,Sbas/L1s"],
    },
    CommandSpec {
        name: "PPS",
        class: MessageClass::Api,
        summary: "configure the PPS output",
        get: None,
        post: &["PPS,Type,Mode,Period,Pulsewidth,Cable delay,Polarity"],
    },
    CommandSpec {
        name: "SURVEY",
        class: MessageClass::Api,
        summary: "set the position mode",
        get: None,
        post: &[
            "SURVEY,Position mode[,Sigma threshold,Time threshold][,Latitude,Longitude,Altitude]",
        ],
    },
    CommandSpec {
        name: "RESTART",
        class: MessageClass::Api,
        summary: "restart the receiver",
        get: None,
        post: &["RESTART[,Restart type]"],
    },
    CommandSpec {
        name: "FLASHBACKUP",
        class: MessageClass::Api,
        summary: "back up settings to flash ROM",
        get: Some("FLASHBACKUP,QUERY"),
        post: &["FLASHBACKUP,Type"],
    },
    CommandSpec {
        name: "DEFLS",
        class: MessageClass::Api,
        summary: "set the default leap second",
        get: Some("DEFLS,QUERY"),
        post: &["DEFLS,Sec"],
    },
    CommandSpec {
        name: "TIMEZONE",
        class: MessageClass::Api,
        summary: "set the local zone time offset",
        get: None,
        post: &["TIMEZONE,Sign,Hour,Minute[,Sec]"],
    },
    CommandSpec {
        name: "TIMEALIGN",
        class: MessageClass::Api,
        summary: "select the time reference for output time and PPS",
        get: Some("TIMEALIGN,QUERY"),
        post: &["TIMEALIGN,Mode"],
    },
    CommandSpec {
        name: "TIME",
        class: MessageClass::Api,
        summary: "set the time",
        get: None,
        post: &["TIME,Time of day,Day,Month,Year"],
    },
    CommandSpec {
        name: "FIXMASK",
        class: MessageClass::Api,
        summary: "set tracking masks for satellites",
        get: Some("FIXMASK,QUERY"),
        post: &[
            "FIXMASK,Mode,Elevmask,Reserve,SNRmask,IDSM[,Prohibit SVs(GPS),Prohibit SVs(GLONASS),Prohibit SVs(Galileo),Prohibit SVs(QZSS),Prohibit SVs(SBAS)]",
        ],
    },
    CommandSpec {
        name: "OCP",
        class: MessageClass::Api,
        summary: "set detailed elevation/azimuth masks",
        get: None,
        post: &["OCP,num,el_0,el_1,...,el_19", "OCP,az_1,el_1[,az_2,el_2[,...[,az_9,el_9]]]"],
    },
    CommandSpec {
        name: "NLOSMASK",
        class: MessageClass::Api,
        summary: "configure NLOS satellite rejection",
        get: Some("NLOSMASK,QUERY"),
        post: &["NLOSMASK,mode,Threshold1,Threshold2,Threshold3"],
    },
    CommandSpec {
        name: "MODESET",
        class: MessageClass::Api,
        summary: "set frequency mode transition thresholds",
        get: Some("MODESET,QUERY"),
        post: &["MODESET,Lock port,Coarse lock threshold,phase skip threshold"],
    },
    CommandSpec {
        name: "PHASESKIP",
        class: MessageClass::Api,
        summary: "set the phase skip flag",
        get: None,
        post: &["PHASESKIP,phase skip flag"],
    },
    CommandSpec {
        name: "HOSET",
        class: MessageClass::Api,
        summary: "set holdover learning and available times",
        get: Some("HOSET,QUERY"),
        post: &[
            "HOSET,Ho set flag[,Learning time set0,Available time set0,Learning time set1,Available time set1,Learning time set2,Available time set2]",
        ],
    },
    CommandSpec {
        name: "ANTSET",
        class: MessageClass::Api,
        summary: "configure antenna power feed",
        get: Some("ANTSET,QUERY"),
        post: &["ANTSET,Antenna status"],
    },
    CommandSpec {
        name: "ALMSET",
        class: MessageClass::Api,
        summary: "configure alarm output",
        get: Some("ALMSET,QUERY"),
        post: &["ALMSET,Force alarm,Alarm mask"],
    },
    CommandSpec {
        name: "CROUT",
        class: MessageClass::Api,
        summary: "set CR sentence output",
        get: None,
        post: &["CROUT,Type,Rate"],
    },
    CommandSpec {
        name: "NMEAOUT",
        class: MessageClass::Cfg,
        summary: "set standard NMEA sentence output",
        get: None,
        post: &["NMEAOUT,Type,Interval"],
    },
    CommandSpec {
        name: "UART1",
        class: MessageClass::Cfg,
        summary: "set the serial port baud rate",
        get: None,
        post: &["UART1,Baudrate"],
    },
    CommandSpec {
        name: "VERSION",
        class: MessageClass::Sys,
        summary: "request the software version",
        get: Some("VERSION"),
        post: &[],
    },
];

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

// Long help body: every known command grouped by message class.
pub fn long_help() -> String {
    let mut out = String::from("Commands:\n");
    for class in [MessageClass::Api, MessageClass::Cfg, MessageClass::Sys] {
        out.push_str(&format!("\n  {class}\n"));
        for spec in COMMANDS.iter().filter(|spec| spec.class == class) {
            out.push_str(&format!("    {:<12} {}\n", spec.name, spec.summary));
            if let Some(get) = spec.get {
                out.push_str(&format!("      GET:  {get}\n"));
            }
            for post in spec.post {
                out.push_str(&format!("      POST: {post}\n"));
            }
        }
    }
    out.push_str("\nExamples:\n");
    out.push_str("  perdctl -g GNSS,FIXMASK\n");
    out.push_str("  perdctl -z \"PPS VCLK 1 0 200 0 0,RESTART 0\"\n");
    out.push_str("  perdctl -S 115200\n");
    out
}
